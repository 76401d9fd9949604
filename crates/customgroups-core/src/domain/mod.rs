//! # Custom Groups Core - Domain Module
//! 
//! Records handed out by the Group Store and the per-request principal.

pub mod custom_group;
pub mod membership;
pub mod search;
pub mod principal;

// Re-export all entities
pub use custom_group::{CustomGroup, GroupId, NewGroup};
pub use membership::{removes_last_admin, GroupMembership};
pub use search::SearchFilter;
pub use principal::{IdentityContext, Principal};
