//! Application-wide constants

pub const MAX_PAGE_SIZE: u32 = 100;

/// Fixed node names of the resource tree
pub const USERS_NODE: &str = "users";
pub const GROUPS_NODE: &str = "groups";
pub const MEMBERS_NODE: &str = "members";

pub const DEFAULT_USER_HEADER: &str = "x-remote-user";
