//! Calling principal and the identity port

use serde::{Deserialize, Serialize};

use super::membership::GroupMembership;

/// Supplies the calling principal for the current request.
pub trait IdentityContext: Send + Sync {
    fn current_user_id(&self) -> &str;
    fn is_current_user_super_admin(&self) -> bool;
}

/// Principal resolved for one request. Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub is_super_admin: bool,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, is_super_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            is_super_admin,
        }
    }

    pub fn from_identity(identity: &dyn IdentityContext) -> Self {
        Self::new(identity.current_user_id(), identity.is_current_user_super_admin())
    }

    /// Whether this principal may rename or delete a group, given its own
    /// membership in that group.
    pub fn can_manage(&self, membership: Option<&GroupMembership>) -> bool {
        self.is_super_admin
            || membership.is_some_and(|m| m.user_id == self.user_id && m.is_admin)
    }
}

impl IdentityContext for Principal {
    fn current_user_id(&self) -> &str {
        &self.user_id
    }

    fn is_current_user_super_admin(&self) -> bool {
        self.is_super_admin
    }
}
