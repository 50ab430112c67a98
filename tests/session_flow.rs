//! End-to-end session scenarios.
//!
//! Each test builds the real router over an in-memory SQLite database and a
//! stepped clock, then drives it request by request:
//! 1. Correct login, then a mutation with the issued cookie succeeds.
//! 2. A mutation without a cookie is rejected and the store is unchanged.
//! 3. A wrong password is rejected and no cookie is issued.
//! 4. A cookie used after the session TTL has elapsed is rejected.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use dbviewer::{
    auth::{hash_password, AdminIdentity, AuthConfig, AuthState, Clock, CredentialStore},
    dbviewer::router,
    storage::{self, Record},
};
use secrecy::SecretSlice;
use sqlx::SqlitePool;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use tower::ServiceExt;

const START: i64 = 1_750_000_000;
const TTL: i64 = 1800;

/// Virtual time built on the public `Clock` trait.
struct SteppedClock(AtomicI64);

impl SteppedClock {
    fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for SteppedClock {
    fn now_unix(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

struct Harness {
    app: Router,
    pool: SqlitePool,
    clock: Arc<SteppedClock>,
}

impl Harness {
    async fn new() -> Result<Self> {
        let pool = storage::connect("sqlite::memory:").await?;
        storage::init(&pool).await?;

        let clock = Arc::new(SteppedClock(AtomicI64::new(START)));
        let admin = AdminIdentity::new("admin", hash_password("admin123")?)?;
        let auth_state = AuthState::new(
            AuthConfig::new().with_session_ttl_seconds(TTL),
            CredentialStore::new(admin),
            SecretSlice::from(b"integration-test-secret-0123456789".to_vec()),
            clock.clone(),
        )?;

        Ok(Self {
            app: router(pool.clone(), Arc::new(auth_state)),
            pool,
            clock,
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<Response> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))?;
        Ok(self.app.clone().oneshot(request).await?)
    }

    async fn create(&self, cookie: Option<&str>, title: &str) -> Result<Response> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/data")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = builder.body(Body::from(format!("title={title}&description=e2e")))?;
        Ok(self.app.clone().oneshot(request).await?)
    }

    async fn records(&self) -> Result<Vec<Record>> {
        storage::list_records(&self.pool).await
    }
}

fn carrier(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

#[tokio::test]
async fn login_then_mutate_succeeds() -> Result<()> {
    let harness = Harness::new().await?;

    let login = harness.login("admin", "admin123").await?;
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    let cookie = carrier(&login).context("no session cookie issued")?;

    let response = harness.create(Some(&cookie), "Created").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let records = harness.records().await?;
    assert_eq!(records.len(), 4);
    assert!(records.iter().any(|record| record.title == "Created"));
    Ok(())
}

#[tokio::test]
async fn mutate_without_carrier_is_rejected() -> Result<()> {
    let harness = Harness::new().await?;
    let before = harness.records().await?;

    let response = harness.create(None, "Sneaky").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(harness.records().await?, before);
    Ok(())
}

#[tokio::test]
async fn wrong_password_issues_no_carrier() -> Result<()> {
    let harness = Harness::new().await?;

    let response = harness.login("admin", "wrong-password").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(carrier(&response).is_none());
    Ok(())
}

#[tokio::test]
async fn expired_carrier_is_rejected() -> Result<()> {
    let harness = Harness::new().await?;
    let login = harness.login("admin", "admin123").await?;
    let cookie = carrier(&login).context("no session cookie issued")?;
    let before = harness.records().await?;

    harness.clock.advance(TTL + 1);

    let response = harness.create(Some(&cookie), "Stale").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(harness.records().await?, before);
    Ok(())
}
