//! Request types.
//!
//! [`ApiRequest`] is the logical call a service makes, addressed by a
//! path relative to the versioned API root. [`OutgoingRequest`] is the
//! fully resolved form handed to the HTTP transport.

mod api_request;
mod method;
mod outgoing;

pub use api_request::ApiRequest;
pub use method::HttpMethod;
pub use outgoing::OutgoingRequest;
