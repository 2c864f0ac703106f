pub mod connection;
pub mod migrations;
pub mod storage;

pub use connection::{create_pool, PoolConfig};
pub use migrations::Migrator;
pub use storage::SqliteStorage;
