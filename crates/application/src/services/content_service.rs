//! Saved contents and link parsing under `protected/contents`.

use std::sync::Arc;

use linkhub_domain::{
    AiProvider, ApiRequest, Content, ContentFilters, ContentStats, ContentUpdate, ExportFormat,
    Paginated, PaginationParams, ParseRequest, ParseResponse,
};
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiResult;

const CONTENTS: &str = "protected/contents";

#[derive(Serialize)]
struct EnhanceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_provider: Option<AiProvider>,
}

#[derive(Serialize)]
struct BatchUpdateBody<'a> {
    ids: &'a [i64],
    updates: &'a ContentUpdate,
}

/// Content endpoints.
#[derive(Debug, Clone)]
pub struct ContentService {
    client: Arc<ApiClient>,
}

impl ContentService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Parses a link and saves it to the request's group.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. an unsupported platform or an
    /// exhausted AI quota.
    pub async fn parse_url(&self, request: &ParseRequest) -> ApiResult<ParseResponse> {
        self.client.post(&format!("{CONTENTS}/parse"), request).await
    }

    /// One page of contents matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn list(
        &self,
        filters: &ContentFilters,
        pagination: &PaginationParams,
    ) -> ApiResult<Paginated<Content>> {
        let request = ApiRequest::get(CONTENTS)
            .queries(pagination.to_query())
            .queries(filters.to_query());
        self.client.send(request).await
    }

    /// A single content item.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. 404.
    pub async fn get(&self, id: i64) -> ApiResult<Content> {
        self.client.get(&format!("{CONTENTS}/{id}")).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn update(&self, id: i64, update: &ContentUpdate) -> ApiResult<Content> {
        self.client.put(&format!("{CONTENTS}/{id}"), update).await
    }

    /// Deletes a content item.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .send_ack(ApiRequest::delete(format!("{CONTENTS}/{id}")))
            .await
    }

    /// Re-parses a content item with an AI provider.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. an exhausted AI quota.
    pub async fn enhance_with_ai(
        &self,
        id: i64,
        ai_provider: Option<AiProvider>,
    ) -> ApiResult<Content> {
        self.client
            .post(&format!("{CONTENTS}/{id}/enhance"), &EnhanceBody { ai_provider })
            .await
    }

    /// Applies the same partial update to several items.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn batch_update(&self, ids: &[i64], updates: &ContentUpdate) -> ApiResult<()> {
        let request =
            ApiRequest::put(format!("{CONTENTS}/batch")).json(&BatchUpdateBody { ids, updates })?;
        self.client.send_ack(request).await
    }

    /// Aggregate counters, optionally for one group.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn stats(&self, group_id: Option<i64>) -> ApiResult<ContentStats> {
        let mut request = ApiRequest::get(format!("{CONTENTS}/stats"));
        if let Some(group_id) = group_id.filter(|id| *id != 0) {
            request = request.query("group_id", group_id.to_string());
        }
        self.client.send(request).await
    }

    /// Downloads matching contents as a file in `format`.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn export(
        &self,
        filters: &ContentFilters,
        format: ExportFormat,
    ) -> ApiResult<Vec<u8>> {
        let request = ApiRequest::get(format!("{CONTENTS}/export"))
            .header("Accept", format.media_type())
            .query("format", format.as_str())
            .queries(filters.to_query());
        Ok(self.client.fetch(request).await?.body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{Harness, Reply, ok};
    use linkhub_domain::{HttpMethod, Platform, RawResponse, SortOrder};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn content_json(id: i64) -> Value {
        json!({
            "id": id,
            "url": "https://www.xiaohongshu.com/explore/abc",
            "title": "Noodles",
            "description": "Best noodles in town",
            "platform": "xiaohongshu",
            "parse_type": "basic",
            "tags": ["food"],
            "group_id": 1,
            "user_id": 7,
            "status": "published",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_sends_filters_and_pagination() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Get,
            "protected/contents",
            ok(json!({
                "data": [content_json(1), content_json(2)],
                "pagination": {
                    "page": 2,
                    "page_size": 2,
                    "total": 6,
                    "total_pages": 3,
                    "has_next": true,
                    "has_prev": true
                }
            })),
        );
        let contents = ContentService::new(h.client.clone());
        let filters = ContentFilters {
            platform: vec!["xiaohongshu".into(), "amap".into()],
            search: Some("noodles".into()),
            ..ContentFilters::default()
        };

        let page = contents
            .list(&filters, &PaginationParams::page(2, 2).sorted_by("created_at", SortOrder::Desc))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].platform, Platform::Xiaohongshu);
        assert!(page.pagination.has_next);
        let url = &h.http.calls()[0].url;
        assert_eq!(
            url.query(),
            Some(concat!(
                "page=2&page_size=2&sort_by=created_at&sort_order=desc",
                "&platform=xiaohongshu%2Camap&search=noodles"
            ))
        );
    }

    #[tokio::test]
    async fn test_parse_url() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Post,
            "protected/contents/parse",
            ok(json!({
                "parse_result": {
                    "parse_type": "basic",
                    "platform": "amap",
                    "basic": {"title": "Cafe", "images": ["https://img/1.jpg"]}
                },
                "quota_info": {"ai_quota_used": 3, "ai_quota_limit": 10, "ai_quota_remaining": 7}
            })),
        );
        let contents = ContentService::new(h.client.clone());

        let response = contents
            .parse_url(&ParseRequest::basic("https://www.amap.com/place/1", 1))
            .await
            .unwrap();

        assert_eq!(response.parse_result.platform, Platform::Amap);
        assert_eq!(response.quota_info.unwrap().ai_quota_remaining, 7);
    }

    #[tokio::test]
    async fn test_enhance_omits_missing_provider() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Post, "protected/contents/5/enhance", ok(content_json(5)));
        let contents = ContentService::new(h.client.clone());

        contents.enhance_with_ai(5, None).await.unwrap();
        contents.enhance_with_ai(5, Some(AiProvider::Baidu)).await.unwrap();

        let calls = h.http.calls();
        assert_eq!(calls[0].body.as_deref(), Some("{}"));
        assert_eq!(calls[1].body.as_deref(), Some(r#"{"ai_provider":"baidu"}"#));
    }

    #[tokio::test]
    async fn test_batch_update_and_delete() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Put, "protected/contents/batch", ok(json!(null)));
        h.http.on(
            HttpMethod::Delete,
            "protected/contents/9",
            Reply::Respond(RawResponse::new(204, Vec::<(String, String)>::new(), Vec::new())),
        );
        let contents = ContentService::new(h.client.clone());
        let updates = ContentUpdate {
            tags: Some(vec!["food".into()]),
            ..ContentUpdate::default()
        };

        contents.batch_update(&[1, 2], &updates).await.unwrap();
        contents.delete(9).await.unwrap();

        let body: Value =
            serde_json::from_str(h.http.calls()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"ids": [1, 2], "updates": {"tags": ["food"]}}));
    }

    #[tokio::test]
    async fn test_stats_for_group() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Get,
            "protected/contents/stats",
            ok(json!({
                "total": 4,
                "by_platform": {"amap": 1, "xiaohongshu": 3},
                "recent_activity": [{"date": "2024-01-01", "count": 2}]
            })),
        );
        let contents = ContentService::new(h.client.clone());

        let stats = contents.stats(Some(3)).await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_platform.get("xiaohongshu"), Some(&3));
        assert_eq!(h.http.calls()[0].url.query(), Some("group_id=3"));
    }

    #[tokio::test]
    async fn test_export_returns_raw_bytes() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Get,
            "protected/contents/export",
            Reply::Respond(RawResponse::new(
                200,
                [("content-type", "text/csv")],
                b"id,title\n1,Noodles\n".to_vec(),
            )),
        );
        let contents = ContentService::new(h.client.clone());
        let filters = ContentFilters {
            group_id: Some(2),
            ..ContentFilters::default()
        };

        let bytes = contents.export(&filters, ExportFormat::Csv).await.unwrap();

        assert_eq!(bytes, b"id,title\n1,Noodles\n");
        let call = &h.http.calls()[0];
        assert_eq!(call.url.query(), Some("format=csv&group_id=2"));
        assert_eq!(call.header("accept"), Some("text/csv"));
    }
}
