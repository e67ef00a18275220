//! Direct message endpoints.
//!
//! A direct message is a group chat that happens to have two participants.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use forum_common::AppResult;
use forum_core::{CreateChatInput, GroupChatResponse};
use serde::Deserialize;

use crate::middleware::AppState;

/// Chat to join. Accepts a bare id or `{"groupId": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(String),
    Object {
        #[serde(rename = "groupId")]
        group_id: String,
    },
}

impl GroupRef {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { group_id: id } => id,
        }
    }
}

async fn create_chat(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<CreateChatInput>,
) -> AppResult<Json<GroupChatResponse>> {
    Ok(Json(
        state.group_chat_service.create_chat(&user_id, input).await?,
    ))
}

async fn add_participant(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(group): Json<GroupRef>,
) -> AppResult<Json<GroupChatResponse>> {
    let group_id = group.into_id();
    Ok(Json(
        state
            .group_chat_service
            .add_participant(&user_id, &group_id)
            .await?,
    ))
}

/// Recent conversations, most recently active first.
async fn conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<GroupChatResponse>>> {
    Ok(Json(
        state
            .group_chat_service
            .list_conversations(&user_id)
            .await?,
    ))
}

/// Direct message routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/{user_id}", post(create_chat))
        .route("/direct-message/{user_id}", get(conversations))
        .route("/{user_id}", post(add_participant))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ref_forms() {
        let bare: GroupRef = serde_json::from_str(r#""g1""#).unwrap();
        let object: GroupRef = serde_json::from_str(r#"{"groupId":"g2"}"#).unwrap();

        assert_eq!(bare.into_id(), "g1");
        assert_eq!(object.into_id(), "g2");
    }
}
