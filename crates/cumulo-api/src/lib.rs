// cumulo-api: Async Rust client for the Cumulocity IoT platform (REST + realtime)

pub mod alarms;
pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod identity;
pub mod inventory;
pub mod measurements;
pub mod operations;
pub mod provisioning;
pub mod realtime;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
