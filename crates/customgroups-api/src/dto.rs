//! Request and response payloads

use serde::{Deserialize, Serialize};

use customgroups_core::domain::{CustomGroup, GroupMembership, SearchFilter};
use customgroups_shared::constants::MAX_PAGE_SIZE;

use crate::error::ApiError;

/// Create group request - POST /users, POST /groups
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub uri: String,
    pub display_name: Option<String>,
}

/// Update group request - PATCH .../groups/{uri}
#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub uri: Option<String>,
    pub display_name: Option<String>,
}

/// The one field a PATCH changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    Uri(String),
    DisplayName(String),
}

impl UpdateGroupRequest {
    pub fn into_change(self) -> Result<GroupChange, ApiError> {
        match (self.uri, self.display_name) {
            (Some(uri), None) => Ok(GroupChange::Uri(uri)),
            (None, Some(display_name)) => Ok(GroupChange::DisplayName(display_name)),
            (None, None) => Err(ApiError::BadRequest("Nothing to update".into())),
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "Update either uri or display_name, not both".into(),
            )),
        }
    }
}

/// Add member request - PUT .../members/{userId}
#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    #[serde(default)]
    pub is_admin: bool,
}

/// Listing query string
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub pattern: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<SearchQuery> for SearchFilter {
    fn from(query: SearchQuery) -> Self {
        let pattern = query.pattern.filter(|p| !p.is_empty());
        let limit = query.limit.map(|l| l.min(MAX_PAGE_SIZE));
        SearchFilter::new(pattern, limit, query.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDto {
    pub uri: String,
    pub display_name: String,
}

impl From<&CustomGroup> for GroupDto {
    fn from(group: &CustomGroup) -> Self {
        Self {
            uri: group.uri.clone(),
            display_name: group.display_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub user_id: String,
    pub is_admin: bool,
}

impl From<&GroupMembership> for MemberDto {
    fn from(membership: &GroupMembership) -> Self {
        Self {
            user_id: membership.user_id.clone(),
            is_admin: membership.is_admin,
        }
    }
}

/// Body of a GET on any node
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeView {
    Collection { name: String, children: Vec<String> },
    Groups { name: String, groups: Vec<GroupDto> },
    Group(GroupDto),
    Members { group: String, members: Vec<MemberDto> },
    Member(MemberDto),
}
