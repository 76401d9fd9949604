//! # Custom Groups Infrastructure
//! 
//! Group Store adapters: PostgreSQL and in-memory.

pub mod database;
pub mod memory;

pub use database::{create_pool, run_migrations, PgGroupStore};
pub use memory::InMemoryGroupStore;
