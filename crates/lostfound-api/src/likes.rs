use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use lostfound_types::api::ToggleLikeResponse;
use lostfound_types::models::MessageId;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /messages/{id}/like: flips the caller's like on a message.
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Path(message_id), _): WithRejection<Path<MessageId>, ApiError>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let liked = state
        .run_db(move |db| Ok(db.toggle_like(caller.user_id, message_id)?))
        .await?;

    Ok(Json(ToggleLikeResponse { liked }))
}
