//! Ouroboros Engine — behavioral-trajectory inference engine.
//!
//! Tracks a per-user creative-vs-consumptive intent vector from recorded
//! experiences and their follow-up evidence, scoring quality, resonance,
//! and temporal arcs, and scheduling future follow-up questions.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;
