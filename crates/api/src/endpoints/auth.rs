//! SSO bridge endpoint.
//!
//! The SSO proxy authenticates the browser and forwards identity headers.
//! The bridge makes sure a user row exists for that identity, then sends the
//! browser on to where it was going.

use axum::{
    Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use forum_common::AppResult;
use serde::Deserialize;

use crate::{extractors::SsoHeaders, middleware::AppState};

/// Auth bridge query.
#[derive(Debug, Deserialize)]
pub struct BridgeQuery {
    /// Path to continue to once the user is known.
    pub target: Option<String>,
}

/// Only same-site absolute paths are followed; anything else lands on `/`.
fn safe_target(target: Option<&str>) -> &str {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.starts_with("/\\") => t,
        _ => "/",
    }
}

async fn auth_bridge(
    State(state): State<AppState>,
    headers: SsoHeaders,
    Query(query): Query<BridgeQuery>,
) -> AppResult<Redirect> {
    let Some(unity_id) = headers.unity_id else {
        tracing::warn!("Auth bridge hit without an identity header");
        return Ok(Redirect::to(&state.config.auth.error_path));
    };

    let user = state
        .user_service
        .find_or_create_faculty(&unity_id, headers.first_name)
        .await?;
    tracing::debug!(user_id = %user.id, "Auth bridge resolved user");

    Ok(Redirect::to(safe_target(query.target.as_deref())))
}

/// SSO bridge routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth-bridge", get(auth_bridge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_target() {
        assert_eq!(safe_target(None), "/");
        assert_eq!(safe_target(Some("/classes/c1")), "/classes/c1");
        assert_eq!(safe_target(Some("https://evil.example")), "/");
        assert_eq!(safe_target(Some("//evil.example")), "/");
        assert_eq!(safe_target(Some("/\\evil.example")), "/");
        assert_eq!(safe_target(Some("")), "/");
    }
}
