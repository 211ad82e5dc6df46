//! Credential persistence.
//!
//! The [`TokenStore`] is the only component that reads or writes the
//! session's tokens.

mod token_store;

pub use token_store::{TokenKeys, TokenStatus, TokenStore};
