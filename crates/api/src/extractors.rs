//! Request extractors.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use forum_core::SsoIdentity;

/// Header carrying the person's unity id.
pub const UNITY_ID_HEADER: &str = "X-Shib-Eptid";
/// Header carrying the person's first name.
pub const FIRST_NAME_HEADER: &str = "X-Shib-FirstName";
/// Header carrying the person's email address.
pub const EMAIL_HEADER: &str = "X-Shib-Email";

/// Identity attributes injected by the SSO proxy in front of the server.
///
/// Headers that are missing, empty or not valid UTF-8 come through as `None`.
#[derive(Debug, Clone, Default)]
pub struct SsoHeaders {
    pub unity_id: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for SsoHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        Ok(Self {
            unity_id: header(UNITY_ID_HEADER),
            first_name: header(FIRST_NAME_HEADER),
            email: header(EMAIL_HEADER),
        })
    }
}

impl From<SsoHeaders> for SsoIdentity {
    fn from(headers: SsoHeaders) -> Self {
        Self {
            unity_id: headers.unity_id,
            display_name: headers.first_name,
            email: headers.email,
        }
    }
}
