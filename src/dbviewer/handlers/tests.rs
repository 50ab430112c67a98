//! Handler tests against the full router and an in-memory database.

use super::super::router;
use crate::{
    auth::{AdminIdentity, AuthConfig, AuthState, CredentialStore, ManualClock},
    storage,
};
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use secrecy::{SecretSlice, SecretString};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;
const TTL: i64 = 600;
const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
    app: Router,
    pool: SqlitePool,
    clock: Arc<ManualClock>,
}

impl TestApp {
    async fn new() -> Result<Self> {
        let pool = storage::connect("sqlite::memory:").await?;
        storage::init(&pool).await?;

        let clock = Arc::new(ManualClock::new(NOW));
        let admin =
            AdminIdentity::from_plaintext("admin", &SecretString::from("admin123".to_string()))?;
        let auth_state = AuthState::new(
            AuthConfig::new().with_session_ttl_seconds(TTL),
            CredentialStore::new(admin),
            SecretSlice::from(vec![5u8; 32]),
            clock.clone(),
        )?;

        Ok(Self {
            app: router(pool.clone(), Arc::new(auth_state)),
            pool,
            clock,
        })
    }

    async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.app.clone().oneshot(request).await?)
    }

    async fn login_form(&self, username: &str, password: &str) -> Result<Response> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/admin/login")
                .header(CONTENT_TYPE, FORM)
                .body(Body::from(format!("username={username}&password={password}")))?,
        )
        .await
    }

    async fn login_json(&self, username: &str, password: &str) -> Result<Response> {
        let payload = json!({ "username": username, "password": password });
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/admin/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))?,
        )
        .await
    }

    /// Log in and return the `name=value` pair to send back as a cookie.
    async fn session(&self) -> Result<String> {
        let response = self.login_form("admin", "admin123").await?;
        carrier(&response).context("login did not set a session cookie")
    }
}

fn carrier(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

async fn body_string(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

async fn body_json(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

fn form_post(uri: &str, cookie: Option<&str>, body: &str) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    Ok(builder.body(Body::from(body.to_string()))?)
}

fn delete(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

#[tokio::test]
async fn form_login_sets_http_only_cookie_and_redirects() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.login_form("admin", "admin123").await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .context("missing Set-Cookie")?;
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains(&format!("Max-Age={TTL}")));
    Ok(())
}

#[tokio::test]
async fn json_login_reports_expiry() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.login_json("admin", "admin123").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(carrier(&response).is_some());
    let body = body_json(response).await?;
    assert_eq!(body["username"], "admin");
    assert_eq!(body["expires_at"], NOW + TTL);
    Ok(())
}

#[tokio::test]
async fn failed_logins_look_identical() -> Result<()> {
    let app = TestApp::new().await?;

    let wrong_password = app.login_json("admin", "wrong").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(carrier(&wrong_password).is_none());

    let unknown_user = app.login_json("root", "admin123").await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(carrier(&unknown_user).is_none());

    assert_eq!(
        body_json(wrong_password).await?,
        body_json(unknown_user).await?
    );
    Ok(())
}

#[tokio::test]
async fn failed_form_login_renders_generic_error() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.login_form("admin", "nope").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(carrier(&response).is_none());
    let html = body_string(response).await?;
    assert!(html.contains("Invalid username or password"));
    Ok(())
}

#[tokio::test]
async fn incomplete_login_is_a_generic_failure() -> Result<()> {
    let app = TestApp::new().await?;

    let response = app
        .send(form_post("/admin/login", None, "username=admin")?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(carrier(&response).is_none());
    let html = body_string(response).await?;
    assert!(html.contains("Invalid username or password"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "admin" }).to_string()))?;
    let missing_password = app.send(request).await?;
    assert_eq!(missing_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = app.login_json("admin", "nope").await?;
    assert_eq!(
        body_json(missing_password).await?,
        body_json(wrong_password).await?
    );
    Ok(())
}

#[tokio::test]
async fn login_page_redirects_authenticated_admin() -> Result<()> {
    let app = TestApp::new().await?;

    let anonymous = app.send(get("/admin/login", None)?).await?;
    assert_eq!(anonymous.status(), StatusCode::OK);

    let cookie = app.session().await?;
    let signed_in = app.send(get("/admin/login", Some(&cookie))?).await?;
    assert_eq!(signed_in.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn index_shows_controls_only_to_admin() -> Result<()> {
    let app = TestApp::new().await?;

    let anonymous = body_string(app.send(get("/", None)?).await?).await?;
    assert!(anonymous.contains("Sample Entry 1"));
    assert!(!anonymous.contains("action=\"/data\""));

    let cookie = app.session().await?;
    let admin = body_string(app.send(get("/", Some(&cookie))?).await?).await?;
    assert!(admin.contains("action=\"/data\""));
    assert!(admin.contains("Signed in as <strong>admin</strong>"));
    Ok(())
}

#[tokio::test]
async fn index_renders_flash_message() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app
        .send(get(
            "/?message=Entry%20created%20successfully&message_type=success",
            None,
        )?)
        .await?;
    let html = body_string(response).await?;
    assert!(html.contains("flash-success"));
    assert!(html.contains("Entry created successfully"));
    Ok(())
}

#[tokio::test]
async fn update_and_delete_with_session() -> Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.session().await?;
    let id = storage::create_record(&app.pool, "Draft", "before").await?;

    let response = app
        .send(form_post(
            &format!("/data/{id}"),
            Some(&cookie),
            "title=Final&description=after",
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let record = storage::get_record(&app.pool, id).await?;
    assert_eq!(record.map(|r| r.title), Some("Final".to_string()));

    let response = app
        .send(delete(&format!("/data/{id}"), Some(&cookie))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(storage::get_record(&app.pool, id).await?, None);
    Ok(())
}

#[tokio::test]
async fn mutations_on_missing_records_return_not_found() -> Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.session().await?;

    let update = app
        .send(form_post("/data/9999", Some(&cookie), "title=x&description=y")?)
        .await?;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let removal = app.send(delete("/data/9999", Some(&cookie))?).await?;
    assert_eq!(removal.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn blank_title_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.session().await?;
    let response = app
        .send(form_post("/data", Some(&cookie), "title=%20&description=y")?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(storage::list_records(&app.pool).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_update_and_delete_leave_store_unchanged() -> Result<()> {
    let app = TestApp::new().await?;
    let before = storage::list_records(&app.pool).await?;
    let id = before[0].id;

    let update = app
        .send(form_post(&format!("/data/{id}"), None, "title=Hacked&description=x")?)
        .await?;
    assert_eq!(update.status(), StatusCode::UNAUTHORIZED);

    let forged = app
        .send(delete(&format!("/data/{id}"), Some("access_token=forged.token.value"))?)
        .await?;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(storage::list_records(&app.pool).await?, before);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_but_token_lives_until_expiry() -> Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.session().await?;

    let response = app
        .send(form_post("/admin/logout", Some(&cookie), "")?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .context("missing Set-Cookie")?;
    assert!(cleared.starts_with("access_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    // No server-side revocation: a client that kept the token is still admin.
    let response = app
        .send(form_post("/data", Some(&cookie), "title=After%20logout&description=")?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    app.clock.advance(TTL);
    let response = app
        .send(form_post("/data", Some(&cookie), "title=Too%20late&description=")?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn data_endpoints_are_public() -> Result<()> {
    let app = TestApp::new().await?;

    let list = body_json(app.send(get("/data", None)?).await?).await?;
    let records = list["data"].as_array().context("data is not an array")?;
    assert_eq!(records.len(), 3);

    let id = records[0]["id"].as_i64().context("id is not a number")?;
    let one = app.send(get(&format!("/data/{id}"), None)?).await?;
    assert_eq!(one.status(), StatusCode::OK);
    assert_eq!(body_json(one).await?["id"], id);

    let missing = app.send(get("/data/9999", None)?).await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn health_reports_database() -> Result<()> {
    let app = TestApp::new().await?;

    let response = app.send(get("/health", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await?;
    assert_eq!(body["database"], "ok");
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));

    let options = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/health")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(options.status(), StatusCode::OK);
    assert!(body_string(options).await?.is_empty());
    Ok(())
}
