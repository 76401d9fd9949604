//! # Custom Groups Shared
//! 
//! Configuration, telemetry, and constants shared by the custom groups crates.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use error::AppError;
