//! Ports: traits the domain depends on and adapters implement.

pub mod storage;
pub mod web_client;

pub use storage::{ConversationRow, Storage};
pub use web_client::{EvidenceKind, EvidenceRequest, EvidenceResponse, SearchResult, WebClient, WebPage};
