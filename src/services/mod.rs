//! Pure and semi-pure scorers, plus the orchestrator that sequences them.
//!
//! Each scorer below is a stateless service: its only state is the
//! `Trajectory`/`Experience` passed in and returned, per spec.md §9's
//! re-architecture note ("Scorers as stateless services").

pub mod artifact_verifier;
pub mod extrapolation_model;
pub mod intention_classifier;
pub mod orchestrator;
pub mod ouroboros_anchor;
pub mod propagation_tracker;
pub mod quality_assessor;
pub mod question_engine;
pub mod resonance;
pub mod temporal_evaluator;
pub mod vector_tracker;

pub use artifact_verifier::ArtifactVerifier;
pub use extrapolation_model::ExtrapolationModel;
pub use intention_classifier::{Classification, IntentionClassifier};
pub use orchestrator::Orchestrator;
pub use ouroboros_anchor::OuroborosAnchor;
pub use propagation_tracker::PropagationTracker;
pub use quality_assessor::QualityAssessor;
pub use question_engine::QuestionEngine;
pub use resonance::{ResonanceTracker, ResonanceValidator};
pub use temporal_evaluator::TemporalEvaluator;
pub use vector_tracker::VectorTracker;
