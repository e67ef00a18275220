//! User, profile and friendship endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use forum_common::AppResult;
use forum_core::{
    CreateUserInput, FollowedDepartment, FriendDto, ProfileDto, UpdateUserInput, UserResponse,
};

use crate::{extractors::SsoHeaders, middleware::AppState};

/// Profile of the signed-in person, created on first visit.
async fn profile(
    State(state): State<AppState>,
    headers: SsoHeaders,
) -> AppResult<Json<ProfileDto>> {
    let profile = state.user_service.provision_profile(headers.into()).await?;
    Ok(Json(profile))
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_all().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.create(input).await?;
    Ok(Json(user.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_by_id(&id).await?;
    Ok(Json(user.into()))
}

/// Look a user up by unity id.
async fn show_by_unity_id(
    State(state): State<AppState>,
    Path(unity_id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_by_unity_id(&unity_id).await?;
    Ok(Json(user.into()))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.update(&id, input).await?;
    Ok(Json(user.into()))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.user_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn student_discussion(
    State(state): State<AppState>,
    Path(unity_id): Path<String>,
) -> AppResult<&'static str> {
    state.user_service.student_area(&unity_id).await
}

// ==================== Friends ====================

async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(String, String)>,
) -> AppResult<&'static str> {
    state.friendship_service.send_request(&id, &friend_id).await
}

/// `PENDING`, `FRIENDS` or `NONE` as plain text.
async fn friend_status(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(String, String)>,
) -> AppResult<&'static str> {
    let status = state.friendship_service.status(&id, &friend_id).await?;
    Ok(status.as_str())
}

async fn accept_friend(
    State(state): State<AppState>,
    Path((id, requester_id)): Path<(String, String)>,
) -> AppResult<&'static str> {
    state
        .friendship_service
        .accept_request(&id, &requester_id)
        .await
}

async fn friends(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FriendDto>> {
    Ok(Json(state.friendship_service.list_friends(&id).await?))
}

async fn friend_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FriendDto>> {
    Ok(Json(state.friendship_service.list_requests(&id).await?))
}

async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(String, String)>,
) -> AppResult<&'static str> {
    state.friendship_service.remove_friend(&id, &friend_id).await
}

// ==================== Followed departments ====================

async fn departments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<FollowedDepartment>>> {
    let departments = state.user_service.followed_departments(&id).await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

async fn follow_department(
    State(state): State<AppState>,
    Path((id, department_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .follow_department(&id, &department_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unfollow_department(
    State(state): State<AppState>,
    Path((id, department_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .unfollow_department(&id, &department_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User, profile and friendship routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/profile/{id}", get(show_by_unity_id))
        .route(
            "/profile/{id}/add-friend/{friend_id}",
            post(add_friend).get(friend_status),
        )
        .route("/profile/{id}/accept-friend/{requester_id}", post(accept_friend))
        .route("/profile/{id}/friends", get(friends))
        .route("/profile/{id}/friend-requests", get(friend_requests))
        .route("/users", get(list).post(create))
        .route("/users/id/{id}", get(show))
        .route("/users/{id}", put(update).delete(delete))
        .route("/users/student-discussion/{id}", get(student_discussion))
        .route("/users/{id}/remove-friend/{friend_id}", axum::routing::delete(remove_friend))
        .route("/users/{id}/departments", get(departments))
        .route(
            "/users/{id}/departments/{department_id}",
            post(follow_department).delete(unfollow_department),
        )
}
