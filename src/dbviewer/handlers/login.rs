//! Admin login and logout.
//!
//! Login accepts either a form post (browser) or a JSON body (API clients).
//! Failures never say which of username or password was wrong.

use crate::{
    auth::{authenticate, clear_session_cookie, session_cookie, AuthState},
    views,
};
use axum::{
    async_trait,
    extract::{Extension, FromRequest, Request},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Missing fields deserialize as empty and fail the credential check like any other mismatch.
#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    username: String,
    #[schema(format = Password)]
    password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub username: String,
    /// Unix seconds after which the session cookie is no longer honored.
    pub expires_at: i64,
}

/// Login credentials from either a urlencoded form or a JSON body.
#[derive(Debug)]
pub enum LoginBody {
    Form(LoginRequest),
    Json(LoginRequest),
}

#[async_trait]
impl<S> FromRequest<S> for LoginBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(payload) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Json(payload))
        } else {
            let Form(payload) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Form(payload))
        }
    }
}

/// Login form. An already authenticated admin is sent back home.
pub async fn login_page(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    if authenticate(&headers, &auth_state).is_some() {
        return Redirect::to("/").into_response();
    }
    Html(views::login_page(None)).into_response()
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Logged in, session cookie set", body = LoginResponse),
        (status = 303, description = "Form login succeeded, session cookie set"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, body))]
pub async fn login(auth_state: Extension<Arc<AuthState>>, body: LoginBody) -> Response {
    let (request, wants_json) = match body {
        LoginBody::Form(request) => (request, false),
        LoginBody::Json(request) => (request, true),
    };
    let LoginRequest { username, password } = request;

    let valid = auth_state
        .credentials()
        .verify_blocking(username, SecretString::from(password))
        .await;

    if !valid {
        warn!("Failed admin login attempt");
        return if wants_json {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": INVALID_CREDENTIALS })),
            )
                .into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Html(views::login_page(Some(INVALID_CREDENTIALS))),
            )
                .into_response()
        };
    }

    let subject = auth_state.credentials().admin().username();
    let issued = match auth_state.codec().issue(subject) {
        Ok(issued) => issued,
        Err(err) => {
            error!("Failed to issue session token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let cookie = match session_cookie(auth_state.config(), &issued.token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    info!(jti = %issued.claims.jti, "Admin logged in");

    if wants_json {
        let response = LoginResponse {
            username: issued.claims.sub,
            expires_at: issued.claims.exp,
        };
        ([(SET_COOKIE, cookie)], Json(response)).into_response()
    } else {
        ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 303, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
/// Clear the session cookie.
///
/// The token itself stays valid until it expires; there is no server-side revocation.
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> Response {
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response(),
        Err(err) => {
            error!("Failed to build logout cookie: {err}");
            Redirect::to("/").into_response()
        }
    }
}
