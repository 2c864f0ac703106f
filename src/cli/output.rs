//! Output formatting shared by all CLI subcommands.
//!
//! Grounded on the teacher's `cli::output::CommandOutput`/`output`: every
//! command result implements `to_human` (printed directly, often built with
//! `comfy-table`) and `to_json` (pretty-printed when `--json` is passed).

use comfy_table::{Cell, Table};
use console::Style;
use serde::Serialize;

use crate::domain::models::Assessment;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Colorizes a 2x4 matrix position label for terminal output. Respects
/// `NO_COLOR`/non-tty detection via `console::Style`, same as the teacher's
/// status coloring.
pub fn colorize_matrix_position(position: &str) -> String {
    let style = match position {
        "Optimal" => Style::new().green().bold(),
        "Hedonism" | "Junk Food" => Style::new().red(),
        "Slop" => Style::new().red().bold(),
        "Transitional-High" | "Transitional-Low" => Style::new().yellow(),
        _ => Style::new().dim(),
    };
    style.apply_to(position).to_string()
}

/// Shared rendering for the `Assessment` returned by both `experience record`
/// and `followup record`.
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct AssessmentOutput(pub Assessment);

impl CommandOutput for AssessmentOutput {
    fn to_human(&self) -> String {
        let a = &self.0;
        let mut table = Table::new();
        table.set_header(vec!["field", "value"]);
        table.add_row(vec![Cell::new("experience_id"), Cell::new(a.experience_id)]);
        table.add_row(vec![Cell::new("matrix_position"), Cell::new(colorize_matrix_position(&a.matrix_position))]);
        table.add_row(vec![Cell::new("provisional"), Cell::new(a.is_provisional)]);
        table.add_row(vec![
            Cell::new("intention"),
            Cell::new(format!("{} ({:.2})", a.intention.signal, a.intention.confidence)),
        ]);
        table.add_row(vec![Cell::new("quality_score"), Cell::new(format!("{:.3}", a.quality.score))]);
        table.add_row(vec![
            Cell::new("resonance"),
            Cell::new(format!("raw {:.3} / validated {:.3}", a.resonance.raw_score, a.resonance.validated_score)),
        ]);
        table.add_row(vec![
            Cell::new("vector"),
            Cell::new(format!("dir {:.2} mag {:.2} conf {:.2}", a.vector.direction, a.vector.magnitude, a.vector.confidence)),
        ]);
        table.add_row(vec![Cell::new("arc_trend"), Cell::new(a.temporal.arc_trend)]);
        table.add_row(vec![
            Cell::new("drift_check"),
            Cell::new(format!("{}: {}", a.drift_check.valid, a.drift_check.reason)),
        ]);
        table.add_row(vec![
            Cell::new("ouroboros_health"),
            Cell::new(format!("{}: {}", a.ouroboros_health.healthy, a.ouroboros_health.reason)),
        ]);
        table.add_row(vec![Cell::new("questions_scheduled"), Cell::new(a.questions_generated.len())]);

        let mut out = table.to_string();
        if !a.recommendations.is_empty() {
            out.push_str("\n\nrecommendations:\n");
            for r in &a.recommendations {
                out.push_str(&format!("  - {r}\n"));
            }
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to `max` chars, appending an ellipsis if it was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
        truncated.push('\u{2026}');
        truncated
    }
}
