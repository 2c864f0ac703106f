pub mod http_client;
pub mod noop_client;

pub use http_client::HttpWebClient;
pub use noop_client::NoopWebClient;
