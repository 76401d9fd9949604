// ============================================================================
// Custom Groups Core - Group Node
// File: crates/customgroups-core/src/tree/group.rs
// Description: One custom group and its fixed `members` child
// ============================================================================

use async_trait::async_trait;
use tracing::info;

use customgroups_shared::constants::MEMBERS_NODE;

use super::{MembershipNode, Node, ResourceNode, TreeContext};
use crate::domain::{CustomGroup, NewGroup};
use crate::error::DomainError;

/// Node for a single group, named by its uri.
pub struct GroupNode {
    ctx: TreeContext,
    group: CustomGroup,
}

impl GroupNode {
    pub fn new(ctx: TreeContext, group: CustomGroup) -> Self {
        Self { ctx, group }
    }

    pub fn group(&self) -> &CustomGroup {
        &self.group
    }

    pub fn display_name(&self) -> &str {
        &self.group.display_name
    }

    pub fn members(&self) -> MembershipNode {
        MembershipNode::new(self.ctx.clone(), self.group.clone())
    }

    /// Permission failures come from the store unchanged.
    pub async fn set_display_name(&self, display_name: &str) -> Result<(), DomainError> {
        let candidate = NewGroup::new(&self.group.uri, Some(display_name))?;
        self.ctx
            .store()
            .set_display_name(&self.ctx.actor(), self.group.id, &candidate.display_name)
            .await?;
        info!("Group {} display name changed by {}", self.group.uri, self.ctx.current_user_id());
        Ok(())
    }
}

#[async_trait]
impl ResourceNode for GroupNode {
    fn name(&self) -> String {
        self.group.uri.clone()
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        if name == MEMBERS_NODE {
            return Ok(Node::Members(self.members()));
        }
        Err(DomainError::NotFound(format!(
            "No child \"{}\" in group {}",
            name, self.group.uri
        )))
    }

    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        Ok(vec![Node::Members(self.members())])
    }

    async fn delete(&self) -> Result<(), DomainError> {
        self.ctx
            .store()
            .delete_group(&self.ctx.actor(), self.group.id)
            .await?;
        info!("Group {} deleted by {}", self.group.uri, self.ctx.current_user_id());
        Ok(())
    }

    /// Renaming a group node changes its uri.
    async fn set_name(&self, name: &str) -> Result<(), DomainError> {
        let candidate = NewGroup::new(name, Some(&self.group.display_name))?;
        self.ctx
            .store()
            .rename_group(&self.ctx.actor(), self.group.id, &candidate.uri)
            .await?;
        info!("Group {} renamed to {} by {}", self.group.uri, candidate.uri, self.ctx.current_user_id());
        Ok(())
    }
}
