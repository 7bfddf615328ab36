pub mod error;
pub mod identity;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod pagination;
pub mod state;
pub mod stats;
pub mod view;


use axum::{
    Json, Router,
    routing::{get, post},
};

use crate::state::AppState;

/// All board routes with identity resolution applied. Transport layers
/// (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/messages", get(messages::list_messages).post(messages::create_message))
        .route("/messages/stats", get(stats::global_stats))
        .route("/messages/user/stats", get(stats::current_user_stats))
        .route("/messages/user/{user_id}/stats", get(stats::user_stats))
        .route(
            "/messages/{message_id}",
            get(messages::get_thread).delete(messages::delete_message),
        )
        .route("/messages/{message_id}/replies", get(messages::list_replies))
        .route("/messages/{message_id}/like", post(likes::toggle_like))
        .route("/messages/{message_id}/stats", get(stats::message_stats))
        .route("/health", get(health))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_viewer,
        ))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
