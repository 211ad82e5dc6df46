//! ID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v7 as a string.
///
/// Used as the `X-Request-Id` of every outgoing call; v7 ids sort by
/// creation time, which keeps request logs in order.
#[must_use]
pub fn generate_id_v7() -> String {
    Uuid::now_v7().to_string()
}
