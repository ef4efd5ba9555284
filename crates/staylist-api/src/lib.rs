// staylist-api: Async Rust client for the catalog store's REST collections

pub mod client;
pub mod error;
pub mod transport;

pub use client::StoreClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
