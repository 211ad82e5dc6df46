//! Linkhub Domain - Core business types
//!
//! This crate defines the data model shared by the Linkhub API client:
//! credential records, request and response shapes, the backend's
//! response envelope, and the resources exposed by the dashboard API.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod content;
pub mod error;
pub mod group;
pub mod id;
pub mod link;
pub mod pagination;
pub mod request;
pub mod response;
pub mod settings;

pub use auth::{
    AuthSession, LoginRequest, PhoneLoginRequest, RegisterRequest, TokenBundle, TokenRecord,
    User, UserRole, UserStatus, DEFAULT_TOKEN_TYPE,
};
pub use content::{
    ActivityPoint, AiProvider, BasicParseResult, Content, ContentFilters, ContentStats,
    ContentStatus, ContentUpdate, ExportFormat, ParseRequest, ParseResponse, ParseResult,
    ParseType, QuotaInfo,
};
pub use error::{DomainError, DomainResult};
pub use group::{
    CreateGroupRequest, Group, GroupMember, GroupSettings, GroupSettingsPatch, InviteMembersRequest,
    MemberRole, MemberStatus, UpdateGroupRequest,
};
pub use id::generate_id_v7;
pub use link::{LinkMetadata, Platform};
pub use pagination::{PageInfo, Paginated, PaginationParams, SortOrder};
pub use request::{ApiRequest, HttpMethod, OutgoingRequest};
pub use response::{Envelope, EnvelopeError, RawResponse, Rejection, ResponseBody};
pub use settings::ClientConfig;
