//! Resource tree scenarios over the in-memory store

use std::sync::Arc;

use customgroups_core::domain::{Principal, SearchFilter};
use customgroups_core::repositories::GroupStore;
use customgroups_core::{DomainError, Node, ResourceNode, ResourceTree, TreeContext};
use customgroups_infrastructure::InMemoryGroupStore;

fn tree(store: &InMemoryGroupStore, user_id: &str, is_super_admin: bool) -> ResourceTree {
    let identity = Arc::new(Principal::new(user_id, is_super_admin));
    ResourceTree::new(TreeContext::new(Arc::new(store.clone()), identity))
}

async fn users_node(tree: &ResourceTree) -> Node {
    tree.resolve("/users").await.unwrap()
}

#[tokio::test]
async fn creating_a_group_makes_the_creator_admin() {
    let store = InMemoryGroupStore::new();
    let alice = tree(&store, "alice", false);

    users_node(&alice).await.resource().create_collection("teamx", None).await.unwrap();

    let groups = store
        .get_user_memberships("alice", &SearchFilter::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].uri, "teamx");

    let members = store.get_group_members(groups[0].id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "alice");
    assert!(members[0].is_admin);
}

#[tokio::test]
async fn creating_a_taken_uri_leaves_memberships_alone() {
    let store = InMemoryGroupStore::new();
    users_node(&tree(&store, "alice", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap();

    let err = users_node(&tree(&store, "bob", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists(_)));

    let bob_groups = store.get_user_memberships("bob", &SearchFilter::default()).await.unwrap();
    assert!(bob_groups.is_empty());
}

#[tokio::test]
async fn users_only_see_their_own_memberships() {
    let store = InMemoryGroupStore::new();
    let g1 = store.create_group("g1", "G1").await.unwrap().unwrap();
    let g2 = store.create_group("g2", "G2").await.unwrap().unwrap();
    let root = Principal::new("root", true);
    store.add_first_admin("bob", g2).await.unwrap();
    store.add_to_group(&root, "alice", g1, false).await.unwrap();
    store.add_to_group(&root, "alice", g2, false).await.unwrap();

    let alice = tree(&store, "alice", false);
    assert!(matches!(
        alice.resolve("/users/bob/groups").await,
        Err(DomainError::Forbidden(_))
    ));

    let own = alice.resolve("/users/alice/groups").await.unwrap();
    let names: Vec<String> = own.resource().children().await.unwrap().iter().map(Node::name).collect();
    assert_eq!(names, vec!["g1", "g2"]);

    let root = tree(&store, "root", true);
    let bobs = root.resolve("/users/bob/groups").await.unwrap();
    let names: Vec<String> = bobs.resource().children().await.unwrap().iter().map(Node::name).collect();
    assert_eq!(names, vec!["g2"]);
}

#[tokio::test]
async fn existence_check_hides_other_users() {
    let store = InMemoryGroupStore::new();
    let alice = tree(&store, "alice", false);
    let users = users_node(&alice).await;

    assert_eq!(users.resource().child_exists("alice").await, Ok(true));
    assert_eq!(users.resource().child_exists("bob").await, Ok(false));
    assert_eq!(users.resource().child_exists("nobody").await, Ok(false));
}

#[tokio::test]
async fn membership_changes_report_idempotence_failures() {
    let store = InMemoryGroupStore::new();
    users_node(&tree(&store, "alice", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap();

    let alice = tree(&store, "alice", false);
    let members = match alice.resolve("/users/alice/groups/teamx/members").await.unwrap() {
        Node::Members(members) => members,
        other => panic!("unexpected node {:?}", other),
    };

    members.add_member("bob", false).await.unwrap();
    assert!(matches!(members.add_member("bob", true).await, Err(DomainError::AlreadyExists(_))));

    let listed = members.list().await.unwrap();
    let ids: Vec<(&str, bool)> = listed.iter().map(|m| (m.user_id.as_str(), m.is_admin)).collect();
    assert_eq!(ids, vec![("alice", true), ("bob", false)]);

    members.remove_member("bob").await.unwrap();
    assert!(matches!(members.remove_member("bob").await, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn group_management_follows_store_permissions() {
    let store = InMemoryGroupStore::new();
    users_node(&tree(&store, "alice", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap();
    let group_id = store.get_group_by_uri("teamx").await.unwrap().unwrap().id;
    store
        .add_to_group(&Principal::new("alice", false), "bob", group_id, false)
        .await
        .unwrap();

    let bob = tree(&store, "bob", false);
    let node = bob.resolve("/users/bob/groups/teamx").await.unwrap();
    assert!(matches!(node.resource().delete().await, Err(DomainError::Forbidden(_))));

    let alice = tree(&store, "alice", false);
    let node = alice.resolve("/groups/teamx").await.unwrap();
    node.resource().set_name("teamy").await.unwrap();
    assert!(store.get_group_by_uri("teamx").await.unwrap().is_none());

    let node = alice.resolve("/groups/teamy").await.unwrap();
    node.resource().delete().await.unwrap();
    assert!(matches!(alice.resolve("/groups/teamy").await, Err(DomainError::NotFound(_))));
}

async fn members_of(tree: &ResourceTree, uri: &str) -> Result<Node, DomainError> {
    tree.resolve(&format!("/groups/{}/members", uri)).await
}

#[tokio::test]
async fn outsiders_cannot_take_over_a_group() {
    let store = InMemoryGroupStore::new();
    users_node(&tree(&store, "alice", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap();

    let mallory = tree(&store, "mallory", false);
    let group = match mallory.resolve("/groups/teamx").await.unwrap() {
        Node::Group(group) => group,
        other => panic!("unexpected node {:?}", other),
    };

    let members = group.members();
    assert!(matches!(members.add_member("mallory", true).await, Err(DomainError::Forbidden(_))));
    assert!(matches!(members.remove_member("alice").await, Err(DomainError::Forbidden(_))));
    assert!(matches!(members.list().await, Err(DomainError::Forbidden(_))));
    assert!(matches!(group.delete().await, Err(DomainError::Forbidden(_))));

    let members = store.get_group_members(group.group().id).await.unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, vec!["alice"]);
}

#[tokio::test]
async fn a_group_keeps_at_least_one_admin() {
    let store = InMemoryGroupStore::new();
    users_node(&tree(&store, "alice", false))
        .await
        .resource()
        .create_collection("teamx", None)
        .await
        .unwrap();

    let alice = tree(&store, "alice", false);
    let members = match members_of(&alice, "teamx").await.unwrap() {
        Node::Members(members) => members,
        other => panic!("unexpected node {:?}", other),
    };
    assert!(matches!(members.remove_member("alice").await, Err(DomainError::Conflict(_))));

    members.add_member("carol", true).await.unwrap();
    members.remove_member("alice").await.unwrap();

    let carol = tree(&store, "carol", false);
    let leaf = carol.resolve("/groups/teamx/members/carol").await.unwrap();
    assert!(matches!(leaf.resource().delete().await, Err(DomainError::Conflict(_))));

    let roster = members_of(&alice, "teamx").await.unwrap();
    assert!(matches!(roster.resource().children().await, Err(DomainError::Forbidden(_))));
}
