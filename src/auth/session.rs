//! Session Guard: cookie carrier handling and token resolution.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use tracing::debug;

use super::{principal::Principal, state::AuthConfig, state::AuthState};

pub const SESSION_COOKIE_NAME: &str = "access_token";

/// Resolve a request's carrier into a principal.
///
/// A missing cookie and an invalid token both yield `None`; the reason is only logged.
pub fn authenticate(headers: &HeaderMap, auth_state: &AuthState) -> Option<Principal> {
    let token = extract_session_token(headers)?;
    match auth_state.codec().verify(&token) {
        Ok(claims) => Some(Principal {
            username: claims.sub,
        }),
        Err(err) => {
            debug!("Rejected session token: {err}");
            None
        }
    }
}

/// Build the `HttpOnly` cookie carrying the session token.
///
/// # Errors
/// Returns an error if the token contains characters not allowed in a header.
pub fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that makes the client discard the carrier.
///
/// # Errors
/// Returns an error if the header value cannot be built.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Find the session token in the request's `Cookie` headers.
///
/// The first non-empty `access_token` wins; empty ones left behind by a logout are skipped.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            let val = val.trim();
            if key.trim() != SESSION_COOKIE_NAME || val.is_empty() {
                continue;
            }
            return Some(val.to_string());
        }
    }
    None
}
