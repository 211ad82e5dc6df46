//! Link previews built on the parse endpoint.

use linkhub_domain::{AiProvider, LinkMetadata, ParseRequest, ParseResult, Platform};
use tracing::debug;

use super::ContentService;
use crate::error::ApiResult;

/// Parses shared links into previews.
#[derive(Debug, Clone)]
pub struct LinkParser {
    contents: ContentService,
}

impl LinkParser {
    /// Group links are saved to when the caller does not pick one.
    pub const DEFAULT_GROUP_ID: i64 = 1;

    /// Creates a parser on top of the content service.
    #[must_use]
    pub const fn new(contents: ContentService) -> Self {
        Self { contents }
    }

    /// Full parse result for `url`.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn parse_url_complete(
        &self,
        url: &str,
        group_id: i64,
        force_ai: bool,
    ) -> ApiResult<ParseResult> {
        let mut request = ParseRequest::basic(url, group_id);
        request.force_ai = Some(force_ai);
        debug!(platform = Self::platform_type(url).as_str(), group_id, force_ai, "parsing link");
        Ok(self.contents.parse_url(&request).await?.parse_result)
    }

    /// Preview metadata for `url` from a basic parse.
    ///
    /// # Errors
    ///
    /// Returns the server's error, or [`crate::ApiError::InvalidRequest`]
    /// when `url` has no host.
    pub async fn parse_url(&self, url: &str, group_id: i64) -> ApiResult<LinkMetadata> {
        let result = self.parse_url_complete(url, group_id, false).await?;
        Ok(LinkMetadata::from_parse_result(&result, url)?)
    }

    /// AI-enhanced parse result for `url`.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. an exhausted AI quota.
    pub async fn parse_url_with_ai(
        &self,
        url: &str,
        group_id: i64,
        provider: Option<AiProvider>,
    ) -> ApiResult<ParseResult> {
        let request = ParseRequest::with_ai(url, group_id, provider);
        Ok(self.contents.parse_url(&request).await?.parse_result)
    }

    /// True for links on a platform the parser handles.
    #[must_use]
    pub fn is_supported_platform(url: &str) -> bool {
        Self::platform_type(url).is_supported()
    }

    /// The platform a link belongs to.
    #[must_use]
    pub fn platform_type(url: &str) -> Platform {
        Platform::from_url(url)
    }
}
