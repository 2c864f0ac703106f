//! `ouroboros experience` subcommands.

use anyhow::Result;
use clap::Subcommand;

use crate::cli::output::{output, AssessmentOutput};
use crate::services::Orchestrator;

#[derive(Subcommand, Debug)]
pub enum ExperienceCommands {
    /// Record a new experience and get back its assessment.
    Record {
        /// The user this experience belongs to.
        user: String,
        /// Free-text description of what the user did.
        description: String,
        /// Self-reported rating in [0, 1].
        rating: f64,
        /// Optional surrounding context.
        #[arg(long, default_value = "")]
        context: String,
    },
}

pub async fn handle(orchestrator: &Orchestrator, command: ExperienceCommands, json: bool) -> Result<()> {
    match command {
        ExperienceCommands::Record { user, description, rating, context } => {
            let assessment = orchestrator.process_experience(&user, &description, rating, &context).await?;
            output(&AssessmentOutput(assessment), json);
        }
    }
    Ok(())
}
