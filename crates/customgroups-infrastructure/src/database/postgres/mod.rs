//! PostgreSQL repository implementations

pub mod group_store_impl;

pub use group_store_impl::PgGroupStore;
