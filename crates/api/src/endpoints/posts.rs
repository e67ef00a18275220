//! Forum post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use forum_common::AppResult;
use forum_core::{
    CreateMessageInput, FeedQuery, MessageDetail, MessageResponse, UpdateMessageInput,
};
use serde::Deserialize;

use crate::middleware::AppState;

/// Body of a vote request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub unity_id: Option<String>,
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<MessageResponse>>> {
    Ok(Json(state.message_service.list_all().await?))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateMessageInput>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(state.message_service.create(input).await?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageDetail>> {
    Ok(Json(state.message_service.get(&id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateMessageInput>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(state.message_service.update(&id, input).await?))
}

/// Delete a post and its whole comment thread.
async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<()> {
    state.message_service.delete(&id).await
}

async fn comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    Ok(Json(state.message_service.list_replies(&id).await?))
}

async fn by_department(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    Ok(Json(
        state
            .message_service
            .list_by_department(&department_id, query.into())
            .await?,
    ))
}

async fn like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state
            .message_service
            .like(&id, req.unity_id.as_deref())
            .await?,
    ))
}

async fn dislike(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state
            .message_service
            .dislike(&id, req.unity_id.as_deref())
            .await?,
    ))
}

async fn remove_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state
            .message_service
            .remove_like(&id, req.unity_id.as_deref())
            .await?,
    ))
}

async fn remove_dislike(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state
            .message_service
            .remove_dislike(&id, req.unity_id.as_deref())
            .await?,
    ))
}

/// Forum post routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/department/{department_id}", get(by_department))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/comments", get(comments))
        .route("/{id}/like", post(like))
        .route("/{id}/dislike", post(dislike))
        .route("/{id}/remove/like", put(remove_like))
        .route("/{id}/remove/dislike", put(remove_dislike))
}
