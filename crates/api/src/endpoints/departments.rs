//! Department endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use forum_common::AppResult;
use forum_core::{DepartmentDetail, DepartmentInput, DepartmentResponse};

use crate::middleware::AppState;

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<DepartmentResponse>>> {
    let departments = state.department_service.list_all().await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

/// Department with its classes, professors and posts.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DepartmentDetail>> {
    Ok(Json(state.department_service.get_detail(&id).await?))
}

async fn show_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DepartmentResponse>> {
    let department = state.department_service.get_by_name(&name).await?;
    Ok(Json(department.into()))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<DepartmentInput>,
) -> AppResult<Json<DepartmentResponse>> {
    let department = state.department_service.create(input).await?;
    Ok(Json(department.into()))
}

/// Replace a department, creating it under the given id if missing.
async fn upsert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DepartmentInput>,
) -> AppResult<Json<DepartmentResponse>> {
    let department = state.department_service.upsert(&id, input).await?;
    Ok(Json(department.into()))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<()> {
    state.department_service.delete(&id).await
}

/// Department routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(upsert).delete(delete))
        .route("/specificId/{name}", get(show_by_name))
}
