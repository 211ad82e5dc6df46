//! Typed wrappers over [`crate::ApiClient`] for each backend area.

mod auth_service;
mod content_service;
mod group_service;
mod link_parser;

pub use auth_service::AuthService;
pub use content_service::ContentService;
pub use group_service::GroupService;
pub use link_parser::LinkParser;
