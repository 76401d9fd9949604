//! Repository traits (ports)

pub mod group_store;

pub use group_store::GroupStore;

#[cfg(test)]
pub use group_store::MockGroupStore;
