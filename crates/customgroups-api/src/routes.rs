//! Router assembly

use axum::{
    routing::{get, MethodRouter},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::handlers::{health, nodes};
use crate::state::AppState;

fn node_routes() -> MethodRouter<AppState> {
    get(nodes::get_node)
        .head(nodes::head_node)
        .post(nodes::create_node)
        .patch(nodes::update_node)
        .put(nodes::put_node)
        .delete(nodes::delete_node)
}

/// Build the application router.
///
/// Every path other than `/health` is a tree path and goes through the
/// same method table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", node_routes())
        .route("/{*path}", node_routes())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}
