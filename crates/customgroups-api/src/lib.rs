//! # Custom Groups API
//! 
//! HTTP surface over the resource tree: the request path is the tree path.

pub mod handlers;
pub mod dto;
pub mod error;
pub mod identity;
pub mod path;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
