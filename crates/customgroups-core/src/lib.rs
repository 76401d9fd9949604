//! # Custom Groups Core
//! 
//! Domain records, store and identity ports, and the resource tree that
//! exposes custom groups and their memberships by path.

pub mod domain;
pub mod repositories;
pub mod tree;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
pub use tree::{Node, ResourceNode, ResourceTree, TreeContext};
