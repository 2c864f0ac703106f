//! `ouroboros trajectory` subcommands.

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Table};

use crate::cli::output::{colorize_matrix_position, output, CommandOutput};
use crate::domain::models::Trajectory;
use crate::domain::ports::Storage;

#[derive(Subcommand, Debug)]
pub enum TrajectoryCommands {
    /// Show a user's current aggregate trajectory and experience history.
    Show {
        /// The user to inspect.
        user: String,
    },
}

pub async fn handle(storage: &Arc<dyn Storage>, command: TrajectoryCommands, json: bool) -> Result<()> {
    match command {
        TrajectoryCommands::Show { user } => {
            let trajectory = storage.load_trajectory(&user).await?;
            output(&TrajectoryOutput(trajectory), json);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(transparent)]
struct TrajectoryOutput(Trajectory);

impl CommandOutput for TrajectoryOutput {
    fn to_human(&self) -> String {
        let t = &self.0;
        let mut summary = Table::new();
        summary.set_header(vec!["field", "value"]);
        summary.add_row(vec![Cell::new("user_id"), Cell::new(&t.user_id)]);
        summary.add_row(vec![
            Cell::new("current_vector"),
            Cell::new(format!(
                "dir {:.2} mag {:.2} conf {:.2}",
                t.current_vector.direction, t.current_vector.magnitude, t.current_vector.confidence
            )),
        ]);
        summary.add_row(vec![Cell::new("creation_rate"), Cell::new(format!("{:.3}", t.creation_rate))]);
        summary.add_row(vec![Cell::new("propagation_rate"), Cell::new(format!("{:.3}", t.propagation_rate))]);
        summary.add_row(vec![Cell::new("compounding_direction"), Cell::new(format!("{:.3}", t.compounding_direction))]);
        summary.add_row(vec![Cell::new("experience_count"), Cell::new(t.experiences.len())]);

        let mut history = Table::new();
        history.set_header(vec!["experience", "created_at", "rating", "intention", "quality", "resonance", "position"]);
        for e in &t.experiences {
            history.add_row(vec![
                Cell::new(e.id),
                Cell::new(e.created_at.to_rfc3339()),
                Cell::new(format!("{:.2}", e.rating)),
                Cell::new(format!("{} ({:.2})", e.provisional_intention, e.intention_confidence)),
                Cell::new(format!("{:.3}", e.quality_score)),
                Cell::new(format!("{:.3}", e.resonance_score)),
                Cell::new(colorize_matrix_position(&e.matrix_position)),
            ]);
        }

        format!("{summary}\n\n{history}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}
