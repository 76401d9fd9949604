//! Group membership entity

use serde::{Deserialize, Serialize};

use super::custom_group::GroupId;

/// One user's membership in one group.
///
/// The store keeps at most one record per `(group_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: GroupId,
    pub user_id: String,
    pub is_admin: bool,
}

impl GroupMembership {
    pub fn new(group_id: GroupId, user_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            group_id,
            user_id: user_id.into(),
            is_admin,
        }
    }
}

/// Whether removing `user_id` would leave `members` without any admin.
pub fn removes_last_admin(members: &[GroupMembership], user_id: &str) -> bool {
    let leaving_admin = members.iter().any(|m| m.user_id == user_id && m.is_admin);
    leaving_admin && members.iter().filter(|m| m.is_admin).count() == 1
}
