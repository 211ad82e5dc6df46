//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod key_value;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpFuture, TransportError};
pub use key_value::{KeyValueStore, StorageError};
