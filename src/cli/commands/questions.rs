//! `ouroboros questions` subcommands.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use comfy_table::{Cell, Table};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::PendingQuestion;
use crate::domain::ports::Storage;
use crate::services::QuestionEngine;

#[derive(Subcommand, Debug)]
pub enum QuestionsCommands {
    /// List a user's follow-up questions that are due to be asked.
    Due {
        /// The user to list questions for.
        user: String,
        /// Evaluate due-ness as of this RFC3339 timestamp instead of now.
        #[arg(long)]
        as_of: Option<String>,
    },
}

pub async fn handle(storage: &Arc<dyn Storage>, command: QuestionsCommands, json: bool) -> Result<()> {
    match command {
        QuestionsCommands::Due { user, as_of } => {
            let as_of: DateTime<Utc> = match as_of {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc),
                None => Utc::now(),
            };

            let all_pending = storage.list_pending_questions().await?;
            let user_pending: Vec<PendingQuestion> = all_pending.into_iter().filter(|q| q.user_id == user).collect();

            let engine = QuestionEngine::new();
            let due: Vec<PendingQuestion> = engine.get_due_questions(&user_pending, as_of).into_iter().cloned().collect();

            output(&DueQuestionsOutput(due), json);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct DueQuestionsOutput(Vec<PendingQuestion>);

impl CommandOutput for DueQuestionsOutput {
    fn to_human(&self) -> String {
        if self.0.is_empty() {
            return "no questions due".to_string();
        }
        let mut table = Table::new();
        table.set_header(vec!["experience", "horizon", "ask_after", "text"]);
        for q in &self.0 {
            table.add_row(vec![
                Cell::new(q.experience_id),
                Cell::new(q.horizon),
                Cell::new(q.ask_after.to_rfc3339()),
                Cell::new(&q.text),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}
