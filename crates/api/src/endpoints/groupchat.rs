//! Group chat endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use forum_common::AppResult;
use forum_core::{GroupMessageResponse, SendMessageInput};

use crate::middleware::AppState;

/// Messages in a chat, oldest first.
async fn messages(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<Json<Vec<GroupMessageResponse>>> {
    Ok(Json(state.group_chat_service.list_messages(&group_id).await?))
}

async fn send(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
    Json(input): Json<SendMessageInput>,
) -> AppResult<Json<GroupMessageResponse>> {
    Ok(Json(
        state
            .group_chat_service
            .send_message(&group_id, &user_id, input)
            .await?,
    ))
}

/// Group chat routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{group_id}", get(messages))
        .route("/send/{group_id}/{user_id}", post(send))
}
