use super::handlers::{health, login, records};
use crate::storage::Record;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(description = "Database viewer with a single signed-session admin"),
    paths(
        health::health,
        login::login,
        login::logout,
        records::list_data,
        records::get_data,
        records::create_data,
        records::update_data,
        records::delete_data,
    ),
    components(schemas(
        Record,
        health::Health,
        login::LoginRequest,
        login::LoginResponse,
        records::RecordForm,
        records::DataList,
        records::Message,
    )),
    tags(
        (name = "auth", description = "Admin login and logout"),
        (name = "data", description = "Record listing and admin-only mutations"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
