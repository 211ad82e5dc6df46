//! Groups (teams) and their membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;

/// Role of a member inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Group creator.
    Owner,
    /// Can manage members and settings.
    Admin,
    /// Can share contents.
    #[default]
    Member,
    /// Read-only.
    Viewer,
    /// A role this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Active member.
    #[default]
    Active,
    /// Invitation pending.
    Invited,
    /// Left or removed.
    Inactive,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Group-level policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Whether non-admin members may invite others.
    #[serde(default)]
    pub allow_member_invites: bool,
    /// Whether joins need approval.
    #[serde(default)]
    pub require_approval: bool,
    /// Role given to new members.
    #[serde(default)]
    pub default_role: MemberRole,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            allow_member_invites: true,
            require_approval: false,
            default_role: MemberRole::Member,
        }
    }
}

/// Partial group policy, used when creating or updating a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSettingsPatch {
    /// New invite policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_member_invites: Option<bool>,
    /// New approval policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<bool>,
    /// New default role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_role: Option<MemberRole>,
}

/// A group as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group id.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Owner account id.
    pub owner_id: i64,
    /// Number of members.
    #[serde(default)]
    pub member_count: u64,
    /// Number of shared contents.
    #[serde(default)]
    pub content_count: u64,
    /// Whether the group is invite-only.
    #[serde(default)]
    pub is_private: bool,
    /// Policy.
    #[serde(default)]
    pub settings: GroupSettings,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Membership id.
    pub id: i64,
    /// Group id.
    pub group_id: i64,
    /// Account id.
    pub user_id: i64,
    /// Role in the group.
    #[serde(default)]
    pub role: MemberRole,
    /// Membership state.
    #[serde(default)]
    pub status: MemberStatus,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
    /// The member's account.
    pub user: User,
}

/// Body of the create-group endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Invite-only flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    /// Initial policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<GroupSettingsPatch>,
}

impl CreateGroupRequest {
    /// A group with default policy.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_private: None,
            settings: None,
        }
    }

    /// Marks the group private or public.
    #[must_use]
    pub const fn private(mut self, is_private: bool) -> Self {
        self.is_private = Some(is_private);
        self
    }
}

/// Body of the update-group endpoint; unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New invite-only flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    /// Policy changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<GroupSettingsPatch>,
}

/// Body of the invite endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteMembersRequest {
    /// Addresses to invite.
    pub emails: Vec<String>,
    /// Role to grant; the group default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
    /// Personal note included in the invitation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
