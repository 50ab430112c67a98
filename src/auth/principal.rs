//! Authenticated principal and the authorization choke point.

use axum::http::{HeaderMap, StatusCode};

use super::{session::authenticate, state::AuthState};

/// The admin identity resolved from a valid session token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Resolve the session cookie into a principal, or return 401.
///
/// Every handler that mutates records calls this before doing anything else.
///
/// # Errors
/// Returns `401 Unauthorized` when the carrier is missing or the token is invalid.
pub fn require_admin(headers: &HeaderMap, auth_state: &AuthState) -> Result<Principal, StatusCode> {
    authenticate(headers, auth_state).ok_or(StatusCode::UNAUTHORIZED)
}
