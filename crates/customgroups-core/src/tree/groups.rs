// ============================================================================
// Custom Groups Core - Groups Collection
// File: crates/customgroups-core/src/tree/groups.rs
// Description: Group listing and lookup, over all groups or one user's
// ============================================================================

use async_trait::async_trait;
use tracing::{debug, error, info};

use customgroups_shared::constants::GROUPS_NODE;

use super::{GroupNode, Node, ResourceNode, TreeContext};
use crate::domain::{CustomGroup, NewGroup, SearchFilter};
use crate::error::DomainError;

/// Where a collection's listing comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSource {
    /// The whole catalogue
    All,
    /// Groups the bound user is a member of
    UserMemberships(String),
}

/// Collection of custom groups.
///
/// One implementation serves both the catalogue and the per-user view; the
/// source only changes the listing query, the node name, and whether
/// creation is allowed.
pub struct GroupsCollection {
    ctx: TreeContext,
    source: GroupSource,
}

impl GroupsCollection {
    pub fn all(ctx: TreeContext) -> Self {
        Self { ctx, source: GroupSource::All }
    }

    pub fn for_user(ctx: TreeContext, user_id: impl Into<String>) -> Self {
        Self {
            ctx,
            source: GroupSource::UserMemberships(user_id.into()),
        }
    }

    pub fn source(&self) -> &GroupSource {
        &self.source
    }

    pub fn is_user_scoped(&self) -> bool {
        matches!(self.source, GroupSource::UserMemberships(_))
    }

    /// Groups matching `search`, in store order.
    pub async fn search(&self, search: &SearchFilter) -> Result<Vec<GroupNode>, DomainError> {
        let groups = match &self.source {
            GroupSource::All => self.ctx.store().get_groups(search).await?,
            GroupSource::UserMemberships(user_id) => {
                self.ctx.store().get_user_memberships(user_id, search).await?
            }
        };
        debug!("Listed {} groups from {:?}", groups.len(), self.source);

        Ok(groups
            .into_iter()
            .map(|group| GroupNode::new(self.ctx.clone(), group))
            .collect())
    }

    pub async fn group(&self, uri: &str) -> Result<GroupNode, DomainError> {
        let group = self
            .ctx
            .store()
            .get_group_by_uri(uri)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Group with uri \"{}\" not found", uri)))?;
        Ok(GroupNode::new(self.ctx.clone(), group))
    }

    /// Create a group from this collection.
    pub async fn create_group(&self, uri: &str, display_name: Option<&str>) -> Result<CustomGroup, DomainError> {
        match self.source {
            GroupSource::All => create_group_with_admin(&self.ctx, uri, display_name).await,
            GroupSource::UserMemberships(_) => {
                Err(DomainError::NotSupported("Cannot create regular nodes".into()))
            }
        }
    }
}

#[async_trait]
impl ResourceNode for GroupsCollection {
    fn name(&self) -> String {
        match &self.source {
            GroupSource::All => GROUPS_NODE.to_string(),
            GroupSource::UserMemberships(user_id) => user_id.clone(),
        }
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        self.group(name).await.map(Node::Group)
    }

    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        let nodes = self.search(&SearchFilter::default()).await?;
        Ok(nodes.into_iter().map(Node::Group).collect())
    }

    async fn create_collection(&self, name: &str, display_name: Option<&str>) -> Result<Node, DomainError> {
        let group = self.create_group(name, display_name).await?;
        Ok(Node::Group(GroupNode::new(self.ctx.clone(), group)))
    }
}

/// Create a group and make the calling principal its first admin.
///
/// The two store calls are not atomic. When the admin insert fails the
/// group is left without its bootstrap admin; this is logged and the error
/// surfaced, not repaired.
pub(crate) async fn create_group_with_admin(
    ctx: &TreeContext,
    uri: &str,
    display_name: Option<&str>,
) -> Result<CustomGroup, DomainError> {
    let group = NewGroup::new(uri, display_name)?;

    let group_id = ctx
        .store()
        .create_group(&group.uri, &group.display_name)
        .await?
        .ok_or_else(|| DomainError::AlreadyExists(format!("Group with uri \"{}\" already exists", group.uri)))?;

    let creator = ctx.current_user_id();
    if let Err(e) = ctx.store().add_first_admin(creator, group_id).await {
        error!(
            "Group {} ({}) created but adding {} as admin failed: {}",
            group.uri, group_id, creator, e
        );
        return Err(e);
    }

    info!("Group {} ({}) created by {}", group.uri, group_id, creator);
    Ok(CustomGroup::new(group_id, group.uri, group.display_name))
}
