//! Linkhub Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer: a reqwest transport, the system clock, in-memory and
//! JSON-file key-value stores, and the configuration loader.

pub mod adapters;
pub mod persistence;
pub mod settings;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use persistence::{JsonFileStore, MemoryStore};
pub use settings::{ConfigError, default_session_file, load_client_config};
