pub mod logger;

pub use logger::{init, LoggerGuard};
