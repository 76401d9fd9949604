#![cfg(feature = "pg-tests")]
//! PostgreSQL Group Store checks. Needs `DATABASE_URL`; skipped otherwise.

use customgroups_core::domain::Principal;
use customgroups_core::repositories::GroupStore;
use customgroups_core::DomainError;
use customgroups_infrastructure::{create_pool, run_migrations, PgGroupStore};
use customgroups_shared::config::DatabaseSettings;
use uuid::Uuid;

async fn pg_store() -> Option<PgGroupStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set DATABASE_URL");
            return None;
        }
    };
    let settings = DatabaseSettings {
        url,
        max_connections: 5,
        min_connections: 1,
    };
    let pool = match create_pool(&settings).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
            return None;
        }
    };
    run_migrations(&pool).await.expect("migrations");
    Some(PgGroupStore::new(pool))
}

/// Fresh group with `alice` as its only admin.
async fn seeded_group(store: &PgGroupStore) -> Uuid {
    let uri = format!("pg-{}", Uuid::new_v4().simple());
    let group_id = store.create_group(&uri, &uri).await.unwrap().unwrap();
    store.add_first_admin("alice", group_id).await.unwrap();
    group_id
}

#[tokio::test]
async fn pg_first_admin_only_seats_empty_groups() {
    let Some(store) = pg_store().await else { return };
    let group_id = seeded_group(&store).await;

    assert!(matches!(
        store.add_first_admin("mallory", group_id).await,
        Err(DomainError::AlreadyExists(_))
    ));
    assert!(matches!(
        store.add_first_admin("alice", Uuid::new_v4()).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn pg_membership_changes_require_group_admin() {
    let Some(store) = pg_store().await else { return };
    let group_id = seeded_group(&store).await;
    let alice = Principal::new("alice", false);
    let mallory = Principal::new("mallory", false);

    assert!(matches!(
        store.add_to_group(&mallory, "mallory", group_id, true).await,
        Err(DomainError::Forbidden(_))
    ));
    assert_eq!(store.get_group_member(group_id, "mallory").await.unwrap(), None);

    store.add_to_group(&alice, "bob", group_id, false).await.unwrap();
    assert!(matches!(
        store.add_to_group(&alice, "bob", group_id, false).await,
        Err(DomainError::AlreadyExists(_))
    ));
    assert!(matches!(
        store.remove_from_group(&mallory, "bob", group_id).await,
        Err(DomainError::Forbidden(_))
    ));

    store.remove_from_group(&alice, "bob", group_id).await.unwrap();
    assert!(matches!(
        store.remove_from_group(&alice, "bob", group_id).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn pg_last_admin_cannot_be_removed() {
    let Some(store) = pg_store().await else { return };
    let group_id = seeded_group(&store).await;
    let alice = Principal::new("alice", false);
    let root = Principal::new("root", true);

    assert!(matches!(
        store.remove_from_group(&root, "alice", group_id).await,
        Err(DomainError::Conflict(_))
    ));

    store.add_to_group(&alice, "carol", group_id, true).await.unwrap();
    store.remove_from_group(&alice, "alice", group_id).await.unwrap();

    let members = store.get_group_members(group_id).await.unwrap();
    let ids: Vec<(&str, bool)> = members.iter().map(|m| (m.user_id.as_str(), m.is_admin)).collect();
    assert_eq!(ids, vec![("carol", true)]);

    store.delete_group(&root, group_id).await.unwrap();
}
