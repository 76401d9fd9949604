//! In-memory implementation of the Group Store.
//!
//! # Purpose
//! Backs local development and tests without a database. All state is lost
//! on restart.
//!
//! # Consistency
//! Groups and memberships live behind one `tokio::sync::RwLock`, so uri
//! uniqueness on create and every permission check together with the change
//! it guards are serialized within the process. Listings return insertion order
//! before the search filter's offset and limit are applied.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use customgroups_core::domain::{removes_last_admin, CustomGroup, GroupId, GroupMembership, Principal, SearchFilter};
use customgroups_core::error::DomainError;
use customgroups_core::repositories::GroupStore;

#[derive(Debug, Default)]
struct State {
    groups: Vec<CustomGroup>,
    members: Vec<GroupMembership>,
}

impl State {
    fn group(&self, group_id: GroupId) -> Option<&CustomGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    fn member(&self, group_id: GroupId, user_id: &str) -> Option<&GroupMembership> {
        self.members
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
    }

    fn authorize(&self, actor: &Principal, group_id: GroupId) -> Result<usize, DomainError> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| DomainError::NotFound(format!("Group {} not found", group_id)))?;

        if !actor.can_manage(self.member(group_id, &actor.user_id)) {
            return Err(DomainError::Forbidden(format!(
                "{} is not an admin of group {}",
                actor.user_id, self.groups[index].uri
            )));
        }
        Ok(index)
    }
}

/// In-memory Group Store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn create_group(&self, uri: &str, display_name: &str) -> Result<Option<GroupId>, DomainError> {
        let mut state = self.state.write().await;
        if state.groups.iter().any(|g| g.uri == uri) {
            return Ok(None);
        }

        let group_id = Uuid::new_v4();
        state.groups.push(CustomGroup::new(group_id, uri, display_name));
        info!("Group created in memory: {} ({})", uri, group_id);
        Ok(Some(group_id))
    }

    async fn get_group_by_uri(&self, uri: &str) -> Result<Option<CustomGroup>, DomainError> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|g| g.uri == uri).cloned())
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Option<CustomGroup>, DomainError> {
        let state = self.state.read().await;
        Ok(state.group(group_id).cloned())
    }

    async fn get_groups(&self, search: &SearchFilter) -> Result<Vec<CustomGroup>, DomainError> {
        let state = self.state.read().await;
        let matching = state.groups.iter().filter(|g| search.matches(g)).cloned();
        Ok(search.page(matching))
    }

    async fn get_user_memberships(
        &self,
        user_id: &str,
        search: &SearchFilter,
    ) -> Result<Vec<CustomGroup>, DomainError> {
        let state = self.state.read().await;
        let matching = state
            .groups
            .iter()
            .filter(|g| state.member(g.id, user_id).is_some())
            .filter(|g| search.matches(g))
            .cloned();
        Ok(search.page(matching))
    }

    async fn get_group_members(&self, group_id: GroupId) -> Result<Vec<GroupMembership>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn get_group_member(
        &self,
        group_id: GroupId,
        user_id: &str,
    ) -> Result<Option<GroupMembership>, DomainError> {
        let state = self.state.read().await;
        Ok(state.member(group_id, user_id).cloned())
    }

    async fn add_first_admin(&self, user_id: &str, group_id: GroupId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.group(group_id).is_none() {
            return Err(DomainError::NotFound(format!("Group {} not found", group_id)));
        }
        if state.members.iter().any(|m| m.group_id == group_id) {
            return Err(DomainError::AlreadyExists(format!("Group {} already has members", group_id)));
        }

        state.members.push(GroupMembership::new(group_id, user_id, true));
        Ok(())
    }

    async fn add_to_group(
        &self,
        actor: &Principal,
        user_id: &str,
        group_id: GroupId,
        is_admin: bool,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.authorize(actor, group_id)?;
        if state.member(group_id, user_id).is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "User \"{}\" is already a member of group {}",
                user_id, group_id
            )));
        }

        state.members.push(GroupMembership::new(group_id, user_id, is_admin));
        Ok(())
    }

    async fn remove_from_group(&self, actor: &Principal, user_id: &str, group_id: GroupId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.authorize(actor, group_id)?;
        if state.member(group_id, user_id).is_none() {
            return Err(DomainError::NotFound(format!(
                "User \"{}\" is not a member of group {}",
                user_id, group_id
            )));
        }

        let members: Vec<GroupMembership> = state
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        if removes_last_admin(&members, user_id) {
            return Err(DomainError::Conflict(format!(
                "User \"{}\" is the last admin of group {}",
                user_id, group_id
            )));
        }

        state
            .members
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(())
    }

    async fn rename_group(&self, actor: &Principal, group_id: GroupId, new_uri: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let index = state.authorize(actor, group_id)?;
        if state.groups.iter().any(|g| g.uri == new_uri && g.id != group_id) {
            return Err(DomainError::AlreadyExists(format!(
                "Group with uri \"{}\" already exists",
                new_uri
            )));
        }

        state.groups[index].uri = new_uri.to_string();
        Ok(())
    }

    async fn set_display_name(
        &self,
        actor: &Principal,
        group_id: GroupId,
        display_name: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let index = state.authorize(actor, group_id)?;
        state.groups[index].display_name = display_name.to_string();
        Ok(())
    }

    async fn delete_group(&self, actor: &Principal, group_id: GroupId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let index = state.authorize(actor, group_id)?;
        let group = state.groups.remove(index);
        state.members.retain(|m| m.group_id != group_id);
        info!("Group deleted from memory: {} ({})", group.uri, group_id);
        Ok(())
    }
}
