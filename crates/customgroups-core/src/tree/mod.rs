//! # Resource tree
//!
//! Path-addressable view over groups and memberships:
//!
//! ```text
//! /
//! ├── users/{userId}/groups/{groupUri}/members/{memberId}
//! └── groups/{groupUri}/members/{memberId}
//! ```
//!
//! Nodes are request-scoped and hold no authoritative state. Each one is
//! built from a [`TreeContext`] plus the path segment it represents, and
//! children are only built when asked for.

pub mod root;
pub mod users;
pub mod groups;
pub mod group;
pub mod members;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{IdentityContext, Principal};
use crate::error::DomainError;
use crate::repositories::GroupStore;

pub use group::GroupNode;
pub use groups::{GroupSource, GroupsCollection};
pub use members::{MemberNode, MembershipNode};
pub use root::{ResourceTree, RootCollection};
pub use users::UsersCollection;

/// Store and identity handles injected into every node
#[derive(Clone)]
pub struct TreeContext {
    store: Arc<dyn GroupStore>,
    identity: Arc<dyn IdentityContext>,
}

impl TreeContext {
    pub fn new(store: Arc<dyn GroupStore>, identity: Arc<dyn IdentityContext>) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &dyn GroupStore {
        self.store.as_ref()
    }

    pub fn current_user_id(&self) -> &str {
        self.identity.current_user_id()
    }

    pub fn is_super_admin(&self) -> bool {
        self.identity.is_current_user_super_admin()
    }

    /// Acting principal for store calls that apply their own permission rules
    pub fn actor(&self) -> Principal {
        Principal::from_identity(self.identity.as_ref())
    }
}

/// Operations every node answers. Anything a node type does not support
/// fails with `NotSupported`.
#[async_trait]
pub trait ResourceNode: Send + Sync {
    fn name(&self) -> String;

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        None
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        Err(DomainError::NotFound(format!("No child \"{}\" in {}", name, self.name())))
    }

    /// Existence check; never distinguishes "forbidden" from "missing".
    async fn child_exists(&self, name: &str) -> Result<bool, DomainError> {
        flatten_existence(self.child(name).await)
    }

    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        Err(DomainError::NotSupported("Cannot list this collection".into()))
    }

    /// Create a child collection and return it.
    async fn create_collection(&self, _name: &str, _display_name: Option<&str>) -> Result<Node, DomainError> {
        Err(DomainError::NotSupported("Cannot create collections here".into()))
    }

    async fn create_file(&self, _name: &str) -> Result<(), DomainError> {
        Err(DomainError::NotSupported("Cannot create regular nodes".into()))
    }

    async fn delete(&self) -> Result<(), DomainError> {
        Err(DomainError::NotSupported("Cannot delete this node".into()))
    }

    async fn set_name(&self, _name: &str) -> Result<(), DomainError> {
        Err(DomainError::NotSupported("Cannot rename this node".into()))
    }
}

/// Flatten a resolution result into an existence answer.
///
/// `Forbidden` and `NotFound` both read as `false` so a caller probing
/// someone else's id learns nothing. Other failures still propagate.
pub fn flatten_existence<T>(resolution: Result<T, DomainError>) -> Result<bool, DomainError> {
    match resolution {
        Ok(_) => Ok(true),
        Err(DomainError::Forbidden(_)) => Ok(false),
        Err(DomainError::NotFound(_)) => Ok(false),
        Err(other) => Err(other),
    }
}

/// A resolved node
pub enum Node {
    Root(RootCollection),
    Users(UsersCollection),
    Groups(GroupsCollection),
    Group(GroupNode),
    Members(MembershipNode),
    Member(MemberNode),
}

impl Node {
    pub fn resource(&self) -> &dyn ResourceNode {
        match self {
            Node::Root(node) => node,
            Node::Users(node) => node,
            Node::Groups(node) => node,
            Node::Group(node) => node,
            Node::Members(node) => node,
            Node::Member(node) => node,
        }
    }

    pub fn name(&self) -> String {
        self.resource().name()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Users(_) => "users",
            Node::Groups(_) => "groups",
            Node::Group(_) => "group",
            Node::Members(_) => "members",
            Node::Member(_) => "member",
        }
    }

    pub async fn child(&self, name: &str) -> Result<Node, DomainError> {
        self.resource().child(name).await
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::repositories::MockGroupStore;

    pub fn context(store: MockGroupStore, user_id: &str, is_super_admin: bool) -> TreeContext {
        TreeContext::new(Arc::new(store), Arc::new(Principal::new(user_id, is_super_admin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_success_is_true() {
        assert_eq!(flatten_existence(Ok(())), Ok(true));
    }

    #[test]
    fn test_existence_flattens_forbidden() {
        assert_eq!(flatten_existence::<()>(Err(DomainError::Forbidden("x".into()))), Ok(false));
    }

    #[test]
    fn test_existence_flattens_not_found() {
        assert_eq!(flatten_existence::<()>(Err(DomainError::NotFound("x".into()))), Ok(false));
    }

    #[test]
    fn test_existence_propagates_backend_failures() {
        let err = DomainError::DatabaseError("down".into());
        assert_eq!(flatten_existence::<()>(Err(err.clone())), Err(err));
    }
}
