use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use lostfound_db::StoreError;
use lostfound_types::api::{CreateMessageRequest, MessagePage, MessageView, PageQuery, ThreadView};
use lostfound_types::models::{MessageId, Viewer};

use crate::error::ApiError;
use crate::middleware::{AuthUser, CurrentViewer};
use crate::pagination::{self, PageRequest};
use crate::state::AppState;
use crate::view;

/// GET /messages?page=&size=: newest roots first.
pub async fn list_messages(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, ApiError>,
) -> Result<Json<MessagePage>, ApiError> {
    let req = PageRequest::new(query.page, query.size, state.max_page_size)?;

    let page = state
        .run_db(move |db| Ok(pagination::fetch_page(db, req, &viewer)?))
        .await?;

    Ok(Json(page))
}

/// GET /messages/{id}: a message and, for roots, its replies.
pub async fn get_thread(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<MessageId>, ApiError>,
    CurrentViewer(viewer): CurrentViewer,
) -> Result<Json<ThreadView>, ApiError> {
    let snapshot = state
        .run_db(move |db| Ok(db.thread(message_id, viewer.user_id)?))
        .await?;

    let mut views = view::assemble(snapshot, &viewer).into_iter();
    let message = views.next().ok_or_else(|| missing_view(message_id))?;

    Ok(Json(ThreadView {
        message,
        replies: views.collect(),
    }))
}

/// GET /messages/{id}/replies: replies to a root, oldest first.
pub async fn list_replies(
    State(state): State<AppState>,
    WithRejection(Path(root_id), _): WithRejection<Path<MessageId>, ApiError>,
    CurrentViewer(viewer): CurrentViewer,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let snapshot = state
        .run_db(move |db| Ok(db.replies(root_id, viewer.user_id)?))
        .await?;

    Ok(Json(view::assemble(snapshot, &viewer)))
}

/// POST /messages: post a root, or a reply when `parent_id` is set.
pub async fn create_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateMessageRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .run_db(move |db| {
            let message = db.create_message(caller.user_id, &req.content, req.parent_id)?;
            Ok(db.annotate(vec![message], Some(caller.user_id))?)
        })
        .await?;

    let created = view::assemble(snapshot, &Viewer::from(caller))
        .pop()
        .ok_or_else(|| ApiError::from(StoreError::Invariant("no view for new message".into())))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /messages/{id}: author or admin only; roots take their replies
/// with them.
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Path(message_id), _): WithRejection<Path<MessageId>, ApiError>,
) -> Result<StatusCode, ApiError> {
    state
        .run_db(move |db| Ok(db.delete_message(message_id, caller)?))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn missing_view(id: MessageId) -> ApiError {
    StoreError::Invariant(format!("no view assembled for message {}", id)).into()
}
