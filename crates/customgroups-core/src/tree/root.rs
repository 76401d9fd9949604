// ============================================================================
// Custom Groups Core - Tree Root & Path Resolution
// File: crates/customgroups-core/src/tree/root.rs
// ============================================================================
//! Root collection and top-down path resolution

use async_trait::async_trait;
use tracing::debug;

use customgroups_shared::constants::{GROUPS_NODE, USERS_NODE};

use super::{GroupsCollection, Node, ResourceNode, TreeContext, UsersCollection};
use crate::error::DomainError;

/// Tree root with the fixed children `users` and `groups`
pub struct RootCollection {
    ctx: TreeContext,
}

impl RootCollection {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ResourceNode for RootCollection {
    fn name(&self) -> String {
        String::new()
    }

    async fn child(&self, name: &str) -> Result<Node, DomainError> {
        match name {
            USERS_NODE => Ok(Node::Users(UsersCollection::new(self.ctx.clone()))),
            GROUPS_NODE => Ok(Node::Groups(GroupsCollection::all(self.ctx.clone()))),
            _ => Err(DomainError::NotFound(format!("No such collection \"{}\"", name))),
        }
    }

    async fn children(&self) -> Result<Vec<Node>, DomainError> {
        Ok(vec![
            Node::Users(UsersCollection::new(self.ctx.clone())),
            Node::Groups(GroupsCollection::all(self.ctx.clone())),
        ])
    }
}

/// Per-request entry point for path resolution
pub struct ResourceTree {
    ctx: TreeContext,
}

impl ResourceTree {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }

    pub fn root(&self) -> RootCollection {
        RootCollection::new(self.ctx.clone())
    }

    /// Resolve a `/`-separated path. Segments are taken verbatim.
    pub async fn resolve(&self, path: &str) -> Result<Node, DomainError> {
        self.resolve_segments(path.split('/')).await
    }

    /// Resolve already-decoded segments one at a time.
    ///
    /// `/users/{userId}` and `/users/{userId}/groups` both name the
    /// user-scoped collection; below it, `groups` is a fixed mount segment
    /// and the next segment is a group uri. Empty segments are ignored.
    pub async fn resolve_segments<I>(&self, segments: I) -> Result<Node, DomainError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut segments = segments.into_iter().filter(|s| !s.as_ref().is_empty());
        let mut node = Node::Root(self.root());

        while let Some(segment) = segments.next() {
            let segment = segment.as_ref();
            node = node.child(segment).await?;
            debug!("Resolved \"{}\" to {:?}", segment, node);

            if let Node::Groups(collection) = &node {
                if collection.is_user_scoped() {
                    match segments.next() {
                        None => break,
                        Some(mount) if mount.as_ref() == GROUPS_NODE => {}
                        Some(other) => {
                            return Err(DomainError::NotFound(format!(
                                "No child \"{}\" in {}",
                                other.as_ref(),
                                collection.name()
                            )))
                        }
                    }
                }
            }
        }

        Ok(node)
    }
}
