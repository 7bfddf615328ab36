use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use lostfound_types::api::{GlobalStats, MessageStats, UserStats};
use lostfound_types::models::MessageId;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn global_stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, ApiError> {
    let stats = state.run_db(|db| Ok(db.global_stats()?)).await?;
    Ok(Json(stats))
}

pub async fn message_stats(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<MessageId>, ApiError>,
) -> Result<Json<MessageStats>, ApiError> {
    let stats = state
        .run_db(move |db| Ok(db.message_stats(message_id)?))
        .await?;
    Ok(Json(stats))
}

pub async fn user_stats(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.run_db(move |db| Ok(db.user_stats(user_id)?)).await?;
    Ok(Json(stats))
}

/// Stats for whoever is calling.
pub async fn current_user_stats(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state
        .run_db(move |db| Ok(db.user_stats(caller.user_id)?))
        .await?;
    Ok(Json(stats))
}
