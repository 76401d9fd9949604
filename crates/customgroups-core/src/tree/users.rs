// ============================================================================
// Custom Groups Core - Users Collection
// File: crates/customgroups-core/src/tree/users.rs
// Description: Per-user membership routing and the self-or-admin rule
// ============================================================================

use async_trait::async_trait;
use tracing::{debug, warn};

use customgroups_shared::constants::USERS_NODE;

use super::groups::create_group_with_admin;
use super::{flatten_existence, GroupNode, GroupsCollection, Node, ResourceNode, TreeContext};
use crate::domain::CustomGroup;
use crate::error::DomainError;

/// Collection of users, fixed name `users`.
///
/// Every per-user view is reached through [`UsersCollection::user_groups`],
/// which is the only place the self-or-super-admin rule is checked.
pub struct UsersCollection {
    ctx: TreeContext,
}

impl UsersCollection {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }

    /// Memberships of `user_id`.
    ///
    /// Users can only query their own memberships; super-admins can query
    /// anyone's.
    pub fn user_groups(&self, user_id: &str) -> Result<GroupsCollection, DomainError> {
        if user_id == self.ctx.current_user_id() || self.ctx.is_super_admin() {
            debug!("{} resolved memberships of {}", self.ctx.current_user_id(), user_id);
            return Ok(GroupsCollection::for_user(self.ctx.clone(), user_id));
        }

        warn!(
            "{} denied access to memberships of another user",
            self.ctx.current_user_id()
        );
        Err(DomainError::Forbidden("Insufficient permissions".into()))
    }

    /// Create a new custom group with the caller as its first admin.
    pub async fn create_group(&self, uri: &str, display_name: Option<&str>) -> Result<CustomGroup, DomainError> {
        create_group_with_admin(&self.ctx, uri, display_name).await
    }
}

#[async_trait]
impl ResourceNode for UsersCollection {
    fn name(&self) -> String {
        USERS_NODE.to_string()
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        self.user_groups(name).map(Node::Groups)
    }

    async fn child_exists(&self, name: &str) -> Result<bool, DomainError> {
        flatten_existence(self.user_groups(name))
    }

    /// Enumerating users is not exposed here.
    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        Err(DomainError::NotSupported("Not supported".into()))
    }

    /// A directory created under `users` is a new group named by `name`.
    async fn create_collection(&self, name: &str, display_name: Option<&str>) -> Result<Node, DomainError> {
        let group = self.create_group(name, display_name).await?;
        Ok(Node::Group(GroupNode::new(self.ctx.clone(), group)))
    }

    async fn delete(&self) -> Result<(), DomainError> {
        Err(DomainError::NotSupported("Cannot delete this collection".into()))
    }

    async fn set_name(&self, _name: &str) -> Result<(), DomainError> {
        Err(DomainError::NotSupported("Cannot rename this collection".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockGroupStore;
    use crate::tree::test_support::context;
    use crate::domain::{GroupId, SearchFilter};
    use uuid::Uuid;

    fn users(store: MockGroupStore, user_id: &str, is_super_admin: bool) -> UsersCollection {
        UsersCollection::new(context(store, user_id, is_super_admin))
    }

    #[test]
    fn test_base() {
        let collection = users(MockGroupStore::new(), "user1", false);
        assert_eq!(collection.name(), "users");
        assert!(collection.last_modified().is_none());
    }

    #[tokio::test]
    async fn test_self_can_resolve_own_memberships() {
        let collection = users(MockGroupStore::new(), "alice", false);
        let node = collection.child("alice").await.unwrap();
        match node {
            Node::Groups(groups) => {
                assert_eq!(groups.name(), "alice");
                assert!(groups.is_user_scoped());
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_user_is_forbidden() {
        let collection = users(MockGroupStore::new(), "alice", false);
        let err = collection.child("bob").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_super_admin_can_resolve_anyone() {
        let collection = users(MockGroupStore::new(), "root", true);
        let node = collection.child("bob").await.unwrap();
        assert_eq!(node.name(), "bob");
    }

    #[tokio::test]
    async fn test_exists_hides_forbidden() {
        let collection = users(MockGroupStore::new(), "alice", false);
        assert_eq!(collection.child_exists("alice").await, Ok(true));
        assert_eq!(collection.child_exists("bob").await, Ok(false));

        let admin = users(MockGroupStore::new(), "root", true);
        assert_eq!(admin.child_exists("bob").await, Ok(true));
    }

    #[tokio::test]
    async fn test_resolved_collection_lists_target_user() {
        let mut store = MockGroupStore::new();
        store
            .expect_get_user_memberships()
            .withf(|user_id: &str, _: &SearchFilter| user_id == "bob")
            .times(1)
            .returning(|_, _| Ok(vec![CustomGroup::new(Uuid::new_v4(), "g1", "G1")]));

        let collection = users(store, "root", true);
        let node = collection.child("bob").await.unwrap();
        let children = node.resource().children().await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "g1");
    }

    #[tokio::test]
    async fn test_create_group_adds_creator_as_admin() {
        let group_id = Uuid::new_v4();
        let mut store = MockGroupStore::new();
        store
            .expect_create_group()
            .withf(|uri: &str, name: &str| uri == "group1" && name == "group1")
            .times(1)
            .returning(move |_, _| Ok(Some(group_id)));
        store
            .expect_add_first_admin()
            .withf(move |user_id: &str, id: &GroupId| user_id == "user1" && *id == group_id)
            .times(1)
            .returning(|_, _| Ok(()));

        let collection = users(store, "user1", false);
        let node = collection.create_collection("group1", None).await.unwrap();
        assert!(matches!(node, Node::Group(_)));
        assert_eq!(node.name(), "group1");
    }

    #[tokio::test]
    async fn test_create_existing_group_fails() {
        let mut store = MockGroupStore::new();
        store.expect_create_group().times(1).returning(|_, _| Ok(None));
        store.expect_add_first_admin().never();

        let collection = users(store, "user1", false);
        let err = collection.create_collection("group1", None).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let collection = users(MockGroupStore::new(), "user1", true);
        assert!(matches!(collection.create_file("somefile.txt").await, Err(DomainError::NotSupported(_))));
        assert!(matches!(collection.children().await, Err(DomainError::NotSupported(_))));
        assert!(matches!(collection.delete().await, Err(DomainError::NotSupported(_))));
        assert!(matches!(collection.set_name("x").await, Err(DomainError::NotSupported(_))));
    }
}
