//! `ouroboros followup` subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::output::{output, AssessmentOutput};
use crate::domain::models::{FollowUp, FollowUpSource};
use crate::services::Orchestrator;

#[derive(Subcommand, Debug)]
pub enum FollowUpCommands {
    /// Record a follow-up against an existing experience.
    Record {
        /// The user this follow-up belongs to.
        user: String,
        /// The experience id this follow-up answers.
        experience: String,
        /// Free-text answer/observation.
        text: String,
        /// Where the evidence came from: user_response, behavioral, system_observation.
        #[arg(long, default_value = "user_response")]
        source: String,
        /// Set if the user created something.
        #[arg(long)]
        created: bool,
        /// How far the creation went, in [0, 1].
        #[arg(long, default_value_t = 0.0)]
        magnitude: f64,
        /// Free-text description of what was created.
        #[arg(long)]
        creation_description: Option<String>,
        /// Set if the user shared or taught what they learned.
        #[arg(long)]
        shared: bool,
        /// Set if this follow-up inspired further action.
        #[arg(long)]
        inspired: bool,
    },
}

pub async fn handle(orchestrator: &Orchestrator, command: FollowUpCommands, json: bool) -> Result<()> {
    match command {
        FollowUpCommands::Record { user, experience, text, source, created, magnitude, creation_description, shared, inspired } => {
            let experience_id = Uuid::parse_str(&experience).context("invalid experience id")?;
            let source = parse_source(&source);

            let mut follow_up = FollowUp::new(experience_id, source, text);
            if created {
                follow_up = follow_up.with_created(magnitude);
            }
            if let Some(desc) = creation_description {
                follow_up = follow_up.with_creation_description(desc);
            }
            follow_up = follow_up.with_shared(shared).with_inspired(inspired);

            match orchestrator.process_follow_up(&user, experience_id, follow_up).await? {
                Some(assessment) => output(&AssessmentOutput(assessment), json),
                None => println!("no experience {experience_id} found for user {user}"),
            }
        }
    }
    Ok(())
}

fn parse_source(raw: &str) -> FollowUpSource {
    match raw {
        "behavioral" => FollowUpSource::Behavioral,
        "system_observation" => FollowUpSource::SystemObservation,
        _ => FollowUpSource::UserResponse,
    }
}
