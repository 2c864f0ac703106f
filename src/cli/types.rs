//! Top-level `clap` command tree.
//!
//! Grounded on the teacher's `cli::types::Cli`/`Commands`: one top-level
//! struct with a global `--json` flag, one `Commands` variant per
//! subsystem, each carrying its own `#[command(subcommand)]` enum.

use clap::{Parser, Subcommand};

use super::commands::{artifact::ArtifactCommands, experience::ExperienceCommands, followup::FollowUpCommands, questions::QuestionsCommands, trajectory::TrajectoryCommands};

#[derive(Parser, Debug)]
#[command(name = "ouroboros", about = "Behavioral-trajectory inference engine CLI", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON instead of human-readable tables.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new experience and get back its assessment.
    #[command(subcommand)]
    Experience(ExperienceCommands),

    /// Record a follow-up against an existing experience.
    #[command(subcommand)]
    FollowUp(FollowUpCommands),

    /// Submit an artifact URL for verification.
    #[command(subcommand)]
    Artifact(ArtifactCommands),

    /// List or act on scheduled follow-up questions.
    #[command(subcommand)]
    Questions(QuestionsCommands),

    /// Inspect a user's trajectory.
    #[command(subcommand)]
    Trajectory(TrajectoryCommands),
}
