//! Async Rust client for the medstock inventory REST API.
//!
//! - **[`InventoryClient`]**: bearer-token authenticated `reqwest` client
//!   covering the collection reads, per-storage lots, the server-side
//!   `?query=` search, and create/update/delete on writable resources.
//! - **[`Resource`]**: the catalogue of collections and their paths.
//! - **[`TransportConfig`]**: TLS and timeout settings for the HTTP client.
//!
//! Response bodies are decoded into any `DeserializeOwned` type; the
//! `medstock-core` crate decodes them into dynamic records.

pub mod client;
pub mod error;
pub mod resource;
pub mod transport;

pub use client::InventoryClient;
pub use error::Error;
pub use resource::Resource;
pub use transport::{TlsMode, TransportConfig};
