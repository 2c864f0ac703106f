//! Domain layer: models, ports (traits adapters implement), and errors.
//!
//! No module here performs I/O directly; that is the adapters' job.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
