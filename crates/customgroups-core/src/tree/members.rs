//! Membership node and member leaves of a group

use async_trait::async_trait;
use tracing::{info, warn};

use customgroups_shared::constants::MEMBERS_NODE;

use super::{Node, ResourceNode, TreeContext};
use crate::domain::{CustomGroup, GroupMembership};
use crate::error::DomainError;

/// Memberships of one group, mounted at `members` under the group.
///
/// Only members of the group and super-admins may read it. Changes are
/// checked by the store against the acting principal. Adding an existing
/// member fails with `AlreadyExists` and removing a non-member fails with
/// `NotFound`; neither is a silent no-op.
pub struct MembershipNode {
    ctx: TreeContext,
    group: CustomGroup,
}

impl MembershipNode {
    pub fn new(ctx: TreeContext, group: CustomGroup) -> Self {
        Self { ctx, group }
    }

    pub fn group(&self) -> &CustomGroup {
        &self.group
    }

    /// Members of the group see its roster; everyone else needs super-admin.
    async fn ensure_readable(&self) -> Result<(), DomainError> {
        if self.ctx.is_super_admin() {
            return Ok(());
        }

        let caller = self.ctx.current_user_id();
        match self.ctx.store().get_group_member(self.group.id, caller).await? {
            Some(_) => Ok(()),
            None => {
                warn!("{} denied access to members of group {}", caller, self.group.uri);
                Err(DomainError::Forbidden("Insufficient permissions".into()))
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<GroupMembership>, DomainError> {
        self.ensure_readable().await?;
        self.ctx.store().get_group_members(self.group.id).await
    }

    pub async fn add_member(&self, user_id: &str, is_admin: bool) -> Result<(), DomainError> {
        self.ctx
            .store()
            .add_to_group(&self.ctx.actor(), user_id, self.group.id, is_admin)
            .await?;
        info!(
            "{} added {} to group {} (admin: {})",
            self.ctx.current_user_id(),
            user_id,
            self.group.uri,
            is_admin
        );
        Ok(())
    }

    pub async fn remove_member(&self, user_id: &str) -> Result<(), DomainError> {
        self.ctx
            .store()
            .remove_from_group(&self.ctx.actor(), user_id, self.group.id)
            .await?;
        info!(
            "{} removed {} from group {}",
            self.ctx.current_user_id(),
            user_id,
            self.group.uri
        );
        Ok(())
    }

    fn member_node(&self, membership: GroupMembership) -> MemberNode {
        MemberNode {
            members: MembershipNode::new(self.ctx.clone(), self.group.clone()),
            membership,
        }
    }
}

#[async_trait]
impl ResourceNode for MembershipNode {
    fn name(&self) -> String {
        MEMBERS_NODE.to_string()
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        self.ensure_readable().await?;
        let membership = self
            .ctx
            .store()
            .get_group_member(self.group.id, name)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("User \"{}\" is not a member of {}", name, self.group.uri))
            })?;
        Ok(Node::Member(self.member_node(membership)))
    }

    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        let memberships = self.list().await?;
        Ok(memberships
            .into_iter()
            .map(|m| Node::Member(self.member_node(m)))
            .collect())
    }
}

/// One membership, named by the member's user id.
pub struct MemberNode {
    members: MembershipNode,
    membership: GroupMembership,
}

impl MemberNode {
    pub fn membership(&self) -> &GroupMembership {
        &self.membership
    }

    pub fn user_id(&self) -> &str {
        &self.membership.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.membership.is_admin
    }
}

#[async_trait]
impl ResourceNode for MemberNode {
    fn name(&self) -> String {
        self.membership.user_id.clone()
    }

    async fn delete(&self) -> Result<(), DomainError> {
        self.members.remove_member(&self.membership.user_id).await
    }
}
