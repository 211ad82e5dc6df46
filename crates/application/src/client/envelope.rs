//! Envelope unwrapping into client errors.

use linkhub_domain::{Envelope, ResponseBody};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// Converts a normalized [`Envelope`] into client results.
pub trait EnvelopeExt<T> {
    /// The payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] for `success: false`, [`ApiError::Decode`]
    /// when a successful envelope carries no data.
    fn into_data(self) -> ApiResult<T>;

    /// Checks `success` and discards the payload.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] for `success: false`.
    fn into_ack(self) -> ApiResult<()>;
}

impl<T> EnvelopeExt<T> for Envelope<T> {
    fn into_data(self) -> ApiResult<T> {
        self.into_result()?
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    fn into_ack(self) -> ApiResult<()> {
        self.into_result().map(|_| ()).map_err(ApiError::from)
    }
}

/// Reads a decoded body as an envelope of `T`.
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: ResponseBody) -> ApiResult<Envelope<T>> {
    match body {
        ResponseBody::Json(value) => {
            Envelope::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
        }
        ResponseBody::Text(text) => Err(ApiError::Decode(format!(
            "expected a JSON body, got {} bytes of text",
            text.len()
        ))),
    }
}
