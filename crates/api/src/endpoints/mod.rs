//! API endpoints.

mod auth;
mod classes;
mod departments;
mod groupchat;
mod health;
mod messages;
mod posts;
mod professors;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, to be mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .nest("/departments", departments::router())
        .nest("/classes", classes::router())
        .nest("/professors", professors::router())
        .nest("/posts", posts::router())
        .nest("/messages", messages::router())
        .nest("/groupchat", groupchat::router())
}

/// Routes served outside `/api`: the SSO bridge and the health check.
pub fn bridge_router() -> Router<AppState> {
    Router::new().merge(auth::router()).merge(health::router())
}
