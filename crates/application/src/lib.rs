//! Linkhub Application - Ports, token store and request dispatcher
//!
//! This crate contains the client logic of Linkhub:
//! - Ports the infrastructure layer implements (clock, key-value storage, HTTP)
//! - The persistent [`TokenStore`]
//! - The [`ApiClient`] dispatcher with single-flight token refresh
//! - Typed services for the auth, content and group endpoints

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{TokenKeys, TokenStatus, TokenStore};
pub use client::{ApiClient, EnvelopeExt};
pub use error::{ApiError, ApiResult, RefreshError};
pub use services::{AuthService, ContentService, GroupService, LinkParser};
