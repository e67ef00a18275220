//! Class endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use forum_common::AppResult;
use forum_core::{ClassDetail, ClassInput, ClassResponse};
use serde::Deserialize;

use crate::middleware::AppState;

/// Create class query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassQuery {
    /// Department to file the class under.
    pub major_id: Option<String>,
}

/// Chat toggle query.
#[derive(Debug, Deserialize)]
pub struct ChatToggleQuery {
    pub enabled: bool,
}

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Popular classes query.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<u64>,
}

fn respond(classes: Vec<forum_db::entities::classes::Model>) -> Json<Vec<ClassResponse>> {
    Json(classes.into_iter().map(Into::into).collect())
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ClassResponse>>> {
    Ok(respond(state.classes_service.list_all().await?))
}

async fn create(
    State(state): State<AppState>,
    Query(query): Query<CreateClassQuery>,
    Json(input): Json<ClassInput>,
) -> AppResult<Json<ClassResponse>> {
    let class = state
        .classes_service
        .create(input, query.major_id.as_deref())
        .await?;
    Ok(Json(class.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ClassDetail>> {
    Ok(Json(state.classes_service.get(&id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ClassInput>,
) -> AppResult<Json<ClassResponse>> {
    Ok(Json(state.classes_service.update(&id, input).await?.into()))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<()> {
    state.classes_service.delete(&id).await
}

async fn set_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChatToggleQuery>,
) -> AppResult<Json<ClassResponse>> {
    let class = state
        .classes_service
        .set_chat_enabled(&id, query.enabled)
        .await?;
    Ok(Json(class.into()))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ClassResponse>>> {
    Ok(respond(state.classes_service.search(&query.q).await?))
}

async fn by_department(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> AppResult<Json<Vec<ClassResponse>>> {
    Ok(respond(
        state
            .classes_service
            .list_by_department(&department_id)
            .await?,
    ))
}

async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<Vec<ClassResponse>>> {
    Ok(respond(state.classes_service.popular(query.limit).await?))
}

async fn follow(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.classes_service.follow(&id).await?;
    Ok(StatusCode::OK)
}

async fn assign_professor(
    State(state): State<AppState>,
    Path((id, professor_id)): Path<(String, String)>,
) -> AppResult<Json<ClassDetail>> {
    Ok(Json(
        state
            .classes_service
            .assign_professor(&id, &professor_id)
            .await?,
    ))
}

async fn unassign_professor(
    State(state): State<AppState>,
    Path((id, professor_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .classes_service
        .unassign_professor(&id, &professor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Class routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/popular", get(popular))
        .route("/department/{department_id}", get(by_department))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/chat", put(set_chat))
        .route("/{id}/follow", post(follow))
        .route(
            "/{id}/professors/{professor_id}",
            post(assign_professor).delete(unassign_professor),
        )
}
