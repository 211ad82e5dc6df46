//! Response types.

mod envelope;
mod raw;

pub use envelope::{Envelope, EnvelopeError, Rejection};
pub use raw::{RawResponse, ResponseBody};
