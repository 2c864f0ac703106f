//! `ouroboros artifact` subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::ArtifactVerification;
use crate::services::Orchestrator;

#[derive(Subcommand, Debug)]
pub enum ArtifactCommands {
    /// Submit an artifact URL for verification.
    Submit {
        /// The user this artifact belongs to.
        user: String,
        /// The experience id this artifact is evidence for.
        experience: String,
        /// The URL to fetch and verify.
        url: String,
        /// What the user claims the artifact demonstrates.
        claim: String,
        /// Optional platform label (e.g. "github", "youtube").
        #[arg(long)]
        platform: Option<String>,
    },
}

pub async fn handle(orchestrator: &Orchestrator, command: ArtifactCommands, json: bool) -> Result<()> {
    match command {
        ArtifactCommands::Submit { user, experience, url, claim, platform } => {
            let experience_id = Uuid::parse_str(&experience).context("invalid experience id")?;
            let verification = orchestrator.submit_artifact(&user, experience_id, &url, &claim, platform).await?;
            output(&ArtifactVerificationOutput(verification), json);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(transparent)]
struct ArtifactVerificationOutput(ArtifactVerification);

impl CommandOutput for ArtifactVerificationOutput {
    fn to_human(&self) -> String {
        let v = &self.0;
        let mut table = Table::new();
        table.set_header(vec!["field", "value"]);
        table.add_row(vec![Cell::new("status"), Cell::new(v.status)]);
        table.add_row(vec![Cell::new("url_accessible"), Cell::new(v.url_accessible)]);
        table.add_row(vec![Cell::new("content_substantive"), Cell::new(v.content_substantive)]);
        table.add_row(vec![Cell::new("timestamp_plausible"), Cell::new(v.timestamp_plausible)]);
        table.add_row(vec![Cell::new("relevance_score"), Cell::new(format!("{:.3}", v.relevance_score))]);
        table.add_row(vec![Cell::new("notes"), Cell::new(&v.notes)]);
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}
