//! HTTP API layer for the forum backend.
//!
//! - **Endpoints**: users and friendships, departments, classes, professors,
//!   forum posts, direct messages and group chats
//! - **Extractors**: SSO identity headers
//! - **Middleware**: application state and request logging
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::{bridge_router, router};
pub use middleware::AppState;
