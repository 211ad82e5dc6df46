//! Groups under `protected/groups`.

use std::sync::Arc;

use linkhub_domain::{
    ApiRequest, CreateGroupRequest, Group, InviteMembersRequest, Paginated, PaginationParams,
    UpdateGroupRequest,
};

use crate::client::ApiClient;
use crate::error::ApiResult;

const GROUPS: &str = "protected/groups";

/// Group endpoints.
#[derive(Debug, Clone)]
pub struct GroupService {
    client: Arc<ApiClient>,
}

impl GroupService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Groups the account belongs to.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn list(&self, pagination: &PaginationParams) -> ApiResult<Paginated<Group>> {
        self.client
            .send(ApiRequest::get(GROUPS).queries(pagination.to_query()))
            .await
    }

    /// A single group.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. 404.
    pub async fn get(&self, id: i64) -> ApiResult<Group> {
        self.client.get(&format!("{GROUPS}/{id}")).await
    }

    /// Creates a group owned by the account.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn create(&self, request: &CreateGroupRequest) -> ApiResult<Group> {
        self.client.post(GROUPS, request).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. 403 for non-admins.
    pub async fn update(&self, id: i64, request: &UpdateGroupRequest) -> ApiResult<Group> {
        self.client.put(&format!("{GROUPS}/{id}"), request).await
    }

    /// Deletes a group.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .send_ack(ApiRequest::delete(format!("{GROUPS}/{id}")))
            .await
    }

    /// Invites people by email.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn invite_members(&self, id: i64, request: &InviteMembersRequest) -> ApiResult<()> {
        let request = ApiRequest::post(format!("{GROUPS}/{id}/invite")).json(request)?;
        self.client.send_ack(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{Harness, ok, status};
    use linkhub_domain::{HttpMethod, MemberRole};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn group_json(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "",
            "owner_id": 7,
            "member_count": 2,
            "settings": {
                "allow_member_invites": false,
                "require_approval": true,
                "default_role": "viewer"
            },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Get,
            "protected/groups",
            ok(json!({
                "data": [group_json(1, "Foodies")],
                "pagination": {"page": 1, "page_size": 20, "total": 1, "total_pages": 1}
            })),
        );
        h.http.on(HttpMethod::Get, "protected/groups/1", ok(group_json(1, "Foodies")));
        let groups = GroupService::new(h.client.clone());

        let page = groups.list(&PaginationParams::page(1, 20)).await.unwrap();
        assert_eq!(page.data[0].name, "Foodies");
        assert_eq!(page.data[0].settings.default_role, MemberRole::Viewer);

        let group = groups.get(1).await.unwrap();
        assert_eq!(group.member_count, 2);
    }

    #[tokio::test]
    async fn test_create_posts_body() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Post, "protected/groups", ok(group_json(2, "Hikers")));
        let groups = GroupService::new(h.client.clone());

        let group = groups
            .create(&CreateGroupRequest::new("Hikers", "weekend trips"))
            .await
            .unwrap();

        assert_eq!(group.id, 2);
        let body: Value = serde_json::from_str(h.http.calls()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Hikers", "description": "weekend trips"}));
    }

    #[tokio::test]
    async fn test_invite_rejected() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(
            HttpMethod::Post,
            "protected/groups/3/invite",
            status(
                403,
                json!({
                    "success": false,
                    "error": {"code": "FORBIDDEN", "message": "members cannot invite"}
                }),
            ),
        );
        let groups = GroupService::new(h.client.clone());
        let invite = InviteMembersRequest {
            emails: vec!["bob@example.com".into()],
            role: None,
            message: None,
        };

        let error = groups.invite_members(3, &invite).await.unwrap_err();

        assert_eq!(error.status(), Some(403));
        assert_eq!(error.to_string(), "members cannot invite");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Put, "protected/groups/4", ok(group_json(4, "Renamed")));
        h.http.on(HttpMethod::Delete, "protected/groups/4", ok(json!(null)));
        let groups = GroupService::new(h.client.clone());

        let update = UpdateGroupRequest {
            name: Some("Renamed".into()),
            ..UpdateGroupRequest::default()
        };
        assert_eq!(groups.update(4, &update).await.unwrap().name, "Renamed");
        groups.delete(4).await.unwrap();

        assert_eq!(h.http.calls()[0].body.as_deref(), Some(r#"{"name":"Renamed"}"#));
        assert_eq!(h.http.calls()[1].body, None);
    }
}
