//! Record endpoints. Reads are public; every mutation goes through `require_admin` first.

use crate::{
    auth::{require_admin, AuthState},
    storage::{self, Record},
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

const CREATED_REDIRECT: &str = "/?message=Entry%20created%20successfully&message_type=success";
const UPDATED_REDIRECT: &str = "/?message=Entry%20updated%20successfully&message_type=success";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RecordForm {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DataList {
    data: Vec<Record>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    message: String,
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(Message {
            message: text.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(context: &str, err: &anyhow::Error) -> Response {
    error!("{context}: {err:#}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

#[utoipa::path(
    get,
    path = "/data",
    responses(
        (status = 200, description = "All records, newest first", body = DataList)
    ),
    tag = "data"
)]
pub async fn list_data(pool: Extension<SqlitePool>) -> Response {
    match storage::list_records(&pool).await {
        Ok(data) => Json(DataList { data }).into_response(),
        Err(err) => internal_error("Failed to list records", &err),
    }
}

#[utoipa::path(
    get,
    path = "/data/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "The record", body = Record),
        (status = 404, description = "Data entry not found", body = Message)
    ),
    tag = "data"
)]
pub async fn get_data(Path(id): Path<i64>, pool: Extension<SqlitePool>) -> Response {
    match storage::get_record(&pool, id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => message(StatusCode::NOT_FOUND, "Data entry not found"),
        Err(err) => internal_error("Failed to fetch record", &err),
    }
}

#[utoipa::path(
    post,
    path = "/data",
    request_body(content = RecordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Entry created, redirect home"),
        (status = 400, description = "Missing title", body = Message),
        (status = 401, description = "Unauthorized")
    ),
    tag = "data"
)]
pub async fn create_data(
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
    Form(form): Form<RecordForm>,
) -> Response {
    let principal = match require_admin(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let title = form.title.trim();
    if title.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Title is required");
    }

    match storage::create_record(&pool, title, &form.description).await {
        Ok(id) => {
            info!(id, admin = %principal.username, "Created record");
            Redirect::to(CREATED_REDIRECT).into_response()
        }
        Err(err) => internal_error("Failed to create record", &err),
    }
}

#[utoipa::path(
    post,
    path = "/data/{id}",
    params(("id" = i64, Path, description = "Record id")),
    request_body(content = RecordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Entry updated, redirect home"),
        (status = 400, description = "Missing title", body = Message),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Data entry not found", body = Message)
    ),
    tag = "data"
)]
pub async fn update_data(
    Path(id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
    Form(form): Form<RecordForm>,
) -> Response {
    let principal = match require_admin(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let title = form.title.trim();
    if title.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Title is required");
    }

    match storage::update_record(&pool, id, title, &form.description).await {
        Ok(true) => {
            info!(id, admin = %principal.username, "Updated record");
            Redirect::to(UPDATED_REDIRECT).into_response()
        }
        Ok(false) => message(StatusCode::NOT_FOUND, "Data entry not found"),
        Err(err) => internal_error("Failed to update record", &err),
    }
}

#[utoipa::path(
    delete,
    path = "/data/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Entry deleted", body = Message),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Data entry not found", body = Message)
    ),
    tag = "data"
)]
pub async fn delete_data(
    Path(id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<SqlitePool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let principal = match require_admin(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    match storage::delete_record(&pool, id).await {
        Ok(true) => {
            info!(id, admin = %principal.username, "Deleted record");
            message(StatusCode::OK, "Entry deleted successfully")
        }
        Ok(false) => message(StatusCode::NOT_FOUND, "Data entry not found"),
        Err(err) => internal_error("Failed to delete record", &err),
    }
}
