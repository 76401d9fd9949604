//! Group store trait (port)
//!
//! The store owns every group and membership record. Concurrent
//! `create_group` calls for one uri must yield at most one success, and
//! permission-checked changes to one group must serialize with the check.
//! Ordering and paging of listings are store-defined.

use async_trait::async_trait;

use crate::domain::{CustomGroup, GroupId, GroupMembership, Principal, SearchFilter};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Returns `None` when the uri is already taken.
    async fn create_group(&self, uri: &str, display_name: &str) -> Result<Option<GroupId>, DomainError>;

    async fn get_group_by_uri(&self, uri: &str) -> Result<Option<CustomGroup>, DomainError>;

    async fn get_group(&self, group_id: GroupId) -> Result<Option<CustomGroup>, DomainError>;

    async fn get_groups(&self, search: &SearchFilter) -> Result<Vec<CustomGroup>, DomainError>;

    /// Groups `user_id` is a member of, matching `search`.
    async fn get_user_memberships(
        &self,
        user_id: &str,
        search: &SearchFilter,
    ) -> Result<Vec<CustomGroup>, DomainError>;

    async fn get_group_members(&self, group_id: GroupId) -> Result<Vec<GroupMembership>, DomainError>;

    async fn get_group_member(
        &self,
        group_id: GroupId,
        user_id: &str,
    ) -> Result<Option<GroupMembership>, DomainError>;

    /// Make `user_id` the admin of a group that has no members yet.
    ///
    /// Fails with `AlreadyExists` once the group has any member, so this can
    /// only seat the creator of a fresh group.
    async fn add_first_admin(&self, user_id: &str, group_id: GroupId) -> Result<(), DomainError>;

    /// Group admins and super-admins only; `AlreadyExists` when the user is
    /// already a member.
    async fn add_to_group(
        &self,
        actor: &Principal,
        user_id: &str,
        group_id: GroupId,
        is_admin: bool,
    ) -> Result<(), DomainError>;

    /// Group admins and super-admins only; `NotFound` when the user is not a
    /// member and `Conflict` when it would leave the group without an admin.
    async fn remove_from_group(&self, actor: &Principal, user_id: &str, group_id: GroupId) -> Result<(), DomainError>;

    /// Group admins and super-admins only; `AlreadyExists` when the uri is taken.
    async fn rename_group(&self, actor: &Principal, group_id: GroupId, new_uri: &str) -> Result<(), DomainError>;

    /// Group admins and super-admins only.
    async fn set_display_name(
        &self,
        actor: &Principal,
        group_id: GroupId,
        display_name: &str,
    ) -> Result<(), DomainError>;

    /// Group admins and super-admins only. Memberships go with the group.
    async fn delete_group(&self, actor: &Principal, group_id: GroupId) -> Result<(), DomainError>;
}
