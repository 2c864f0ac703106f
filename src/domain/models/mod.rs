//! Domain model types: plain data, no I/O, no `async_trait`.

pub mod artifact;
pub mod assessment;
pub mod config;
pub mod experience;
pub mod extrapolation;
pub mod followup;
pub mod horizon;
pub mod intention;
pub mod question;
pub mod trajectory;
pub mod vector;

pub use artifact::{Artifact, ArtifactStatus, ArtifactVerification};
pub use assessment::{
    Assessment, DriftCheck, IntentionExplanation, OuroborosHealth, QualityExplanation,
    ResonanceExplanation, TemporalExplanation, VectorExplanation, WebDegradation,
};
pub use config::{Config, LoggingConfig, StorageConfig, WebClientConfig};
pub use experience::{Experience, HorizonAssessment, QualityDimensions, tokenize};
pub use extrapolation::{Hypothesis, TrajectoryEvidence};
pub use followup::{FollowUp, FollowUpSource};
pub use horizon::{ArcTrend, TimeHorizon};
pub use intention::IntentionSignal;
pub use question::PendingQuestion;
pub use trajectory::Trajectory;
pub use vector::VectorSnapshot;
