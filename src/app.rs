use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/blocks/:slug", get(handlers::block_page))
        .route("/api/blocks", get(handlers::list_blocks))
        .route("/api/blocks/:slug/stats", get(handlers::block_stats))
        .with_state(state)
}
