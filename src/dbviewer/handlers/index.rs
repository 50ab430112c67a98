use crate::{
    auth::{authenticate, AuthState},
    storage,
    views::{self, Flash, FlashKind},
};
use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize, Debug, Default)]
pub struct IndexQuery {
    message: Option<String>,
    message_type: Option<String>,
}

/// Home page listing every record. Admin controls appear for a valid session.
pub async fn index(
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let principal = authenticate(&headers, &auth_state);

    let records = match storage::list_records(&pool).await {
        Ok(records) => records,
        Err(err) => {
            error!("Failed to list records: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let flash = query
        .message
        .filter(|message| !message.is_empty())
        .map(|message| Flash {
            message,
            kind: FlashKind::parse(query.message_type.as_deref()),
        });

    Html(views::index_page(
        &records,
        principal.as_ref().map(|p| p.username.as_str()),
        flash.as_ref(),
    ))
    .into_response()
}
