//! Parsed link contents and the parse endpoint's payloads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::link::Platform;

/// How a content item was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParseType {
    /// Platform scraping only.
    #[default]
    Basic,
    /// Enriched by an AI provider.
    AiEnhanced,
    /// A parse type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Publication state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Not yet shared.
    #[default]
    Draft,
    /// Visible to the group.
    Published,
    /// Hidden from listings.
    Archived,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// AI backends the server can route enhancement requests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Baidu.
    Baidu,
    /// Alibaba.
    Alibaba,
    /// Tencent.
    Tencent,
}

impl AiProvider {
    /// Lower-case name as used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baidu => "baidu",
            Self::Alibaba => "alibaba",
            Self::Tencent => "tencent",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baidu" => Ok(Self::Baidu),
            "alibaba" => Ok(Self::Alibaba),
            "tencent" => Ok(Self::Tencent),
            other => Err(DomainError::InvalidConfig(format!("unknown AI provider: {other}"))),
        }
    }
}

/// A saved content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content id.
    pub id: i64,
    /// Source link.
    pub url: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Full text, when extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Source platform.
    #[serde(default)]
    pub platform: Platform,
    /// How it was parsed.
    #[serde(default)]
    pub parse_type: ParseType,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Platform-specific metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Parser confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Owning group.
    pub group_id: i64,
    /// Creator.
    pub user_id: i64,
    /// Publication state.
    #[serde(default)]
    pub status: ContentStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a content item; unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New full text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New publication state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    /// Move to another group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

/// Body of the parse endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Link to parse.
    pub url: String,
    /// Group the result is saved to.
    pub group_id: i64,
    /// Force AI enhancement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_ai: Option<bool>,
    /// Older name of `force_ai`, still accepted by some deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_ai: Option<bool>,
    /// Preferred AI backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<AiProvider>,
}

impl ParseRequest {
    /// Basic parse of `url` into `group_id`.
    #[must_use]
    pub fn basic(url: impl Into<String>, group_id: i64) -> Self {
        Self {
            url: url.into(),
            group_id,
            force_ai: Some(false),
            use_ai: None,
            ai_provider: None,
        }
    }

    /// AI-enhanced parse, optionally pinned to a provider.
    #[must_use]
    pub fn with_ai(url: impl Into<String>, group_id: i64, provider: Option<AiProvider>) -> Self {
        Self {
            url: url.into(),
            group_id,
            force_ai: Some(true),
            use_ai: None,
            ai_provider: provider,
        }
    }
}

/// Common fields every platform parser produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasicParseResult {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Video URLs.
    #[serde(default)]
    pub videos: Vec<String>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publication date as reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Parser confidence.
    #[serde(default)]
    pub confidence: f64,
    /// When the server parsed the link.
    #[serde(default)]
    pub parsed_at: String,
    /// Server-side parse time.
    #[serde(default)]
    pub parse_time_ms: u64,
}

/// Result of parsing one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Basic or AI-enhanced.
    #[serde(default)]
    pub parse_type: ParseType,
    /// Detected platform.
    #[serde(default)]
    pub platform: Platform,
    /// Common fields.
    pub basic: BasicParseResult,
    /// Platform-specific metadata (note stats, POI details...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_metadata: Option<Map<String, Value>>,
    /// AI-generated metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<Map<String, Value>>,
}

/// AI quota counters returned alongside a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuotaInfo {
    /// Calls used this period.
    pub ai_quota_used: i64,
    /// Calls allowed this period.
    pub ai_quota_limit: i64,
    /// Calls left this period.
    pub ai_quota_remaining: i64,
}

/// Payload of the parse endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    /// The parse result.
    pub parse_result: ParseResult,
    /// Quota after this call, if the plan has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_info: Option<QuotaInfo>,
}

/// Filters for the content list and export endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentFilters {
    /// Platforms to include.
    #[serde(default)]
    pub platform: Vec<String>,
    /// Parse types to include.
    #[serde(default)]
    pub parse_type: Vec<String>,
    /// Tags to include.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lower date bound.
    pub date_from: Option<String>,
    /// Upper date bound.
    pub date_to: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to one group.
    pub group_id: Option<i64>,
}

impl ContentFilters {
    /// Query parameters; lists are comma-joined and empty values omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let lists = [
            ("platform", &self.platform),
            ("parse_type", &self.parse_type),
            ("tags", &self.tags),
        ];
        let scalars = [
            ("date_from", self.date_from.clone()),
            ("date_to", self.date_to.clone()),
            ("search", self.search.clone()),
            ("group_id", self.group_id.filter(|id| *id != 0).map(|id| id.to_string())),
        ];

        lists
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| (key.to_string(), values.join(",")))
            .chain(scalars.into_iter().filter_map(|(key, value)| {
                value
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v))
            }))
            .collect()
    }
}

/// Activity count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoint {
    /// Day.
    pub date: String,
    /// Items created that day.
    pub count: u64,
}

/// Aggregate counters for a user's or group's contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentStats {
    /// Total items.
    pub total: u64,
    /// Count per platform.
    #[serde(default)]
    pub by_platform: BTreeMap<String, u64>,
    /// Count per parse type.
    #[serde(default)]
    pub by_parse_type: BTreeMap<String, u64>,
    /// Count per status.
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    /// Recent daily activity.
    #[serde(default)]
    pub recent_activity: Vec<ActivityPoint>,
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON document.
    #[default]
    Json,
    /// Comma-separated values.
    Csv,
    /// Spreadsheet.
    Excel,
}

impl ExportFormat {
    /// Query-string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }

    /// Media type to ask for when downloading an export.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(DomainError::InvalidConfig(format!("unknown export format: {other}"))),
        }
    }
}
