//! Professor endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use forum_common::AppResult;
use forum_core::{ProfessorInput, ProfessorResponse};

use crate::middleware::AppState;

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ProfessorResponse>>> {
    let professors = state.professor_service.list_all().await?;
    Ok(Json(professors.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProfessorResponse>> {
    Ok(Json(state.professor_service.get(&id).await?.into()))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProfessorInput>,
) -> AppResult<Json<ProfessorResponse>> {
    Ok(Json(state.professor_service.create(input).await?.into()))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProfessorInput>,
) -> AppResult<Json<ProfessorResponse>> {
    Ok(Json(state.professor_service.update(&id, input).await?.into()))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<()> {
    state.professor_service.delete(&id).await
}

/// Professor routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
}
