//! Link platforms and the link preview derived from a parse result.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::ParseResult;
use crate::error::{DomainError, DomainResult};

/// Content platform a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Xiaohongshu notes (`xiaohongshu.com`, `xhslink.com`).
    Xiaohongshu,
    /// Amap / Gaode places (`amap.com`, `gaode.com`).
    #[serde(alias = "gaode")]
    Amap,
    /// Meituan.
    Meituan,
    /// WeChat articles.
    Wechat,
    /// Douyin videos.
    Douyin,
    /// Anything else.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Platform {
    /// Detects the platform from a link's host name.
    ///
    /// Only platforms the parser supports are detected; unparsable URLs
    /// and other hosts yield [`Platform::Unknown`].
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        else {
            return Self::Unknown;
        };

        if host.contains("xiaohongshu.com") || host.contains("xhslink.com") {
            Self::Xiaohongshu
        } else if host.contains("amap.com") || host.contains("gaode.com") {
            Self::Amap
        } else {
            Self::Unknown
        }
    }

    /// True for platforms the link parser can handle.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Xiaohongshu | Self::Amap)
    }

    /// Lower-case name as used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xiaohongshu => "xiaohongshu",
            Self::Amap => "amap",
            Self::Meituan => "meituan",
            Self::Wechat => "wechat",
            Self::Douyin => "douyin",
            Self::Unknown => "unknown",
        }
    }
}

/// Preview card data for a parsed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// The link as submitted.
    pub url: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// First image, or the thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Host name of the link.
    pub domain: String,
    /// Publication date as reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Author as reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl LinkMetadata {
    /// Builds a preview from a parse result for `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if `original_url` has no host.
    pub fn from_parse_result(result: &ParseResult, original_url: &str) -> DomainResult<Self> {
        let parsed = Url::parse(original_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {original_url}")))?;
        let domain = parsed
            .host_str()
            .ok_or_else(|| DomainError::InvalidUrl(format!("missing host: {original_url}")))?
            .to_string();

        let basic = &result.basic;
        Ok(Self {
            url: original_url.to_string(),
            title: basic.title.clone(),
            description: basic.description.clone(),
            image: basic.images.first().cloned().or_else(|| basic.thumbnail.clone()),
            domain,
            published_at: basic.published_at.clone(),
            author: basic.author.clone(),
        })
    }
}
