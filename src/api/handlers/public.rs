//! Unauthenticated sample routes.

use crate::api::{request::Request, response::Response};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Debug)]
pub struct Pong {
    pub pong: bool,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct Greeting {
    pub message: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserId {
    pub user_id: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct Echo {
    /// The request body as parsed: JSON, a raw string, or `null`.
    #[schema(value_type = Object)]
    pub received: Value,
}

#[utoipa::path(
    get,
    path = "/public/ping",
    responses((status = 200, description = "Liveness check", body = Pong)),
    tag = "public"
)]
#[must_use]
pub fn ping() -> Response {
    Response::json(StatusCode::OK, &Pong { pong: true })
}

#[utoipa::path(
    get,
    path = "/hello",
    params(("name" = Option<String>, Query, description = "Who to greet, defaults to world")),
    responses((status = 200, description = "Greeting", body = Greeting)),
    tag = "public"
)]
#[must_use]
pub fn hello(request: &Request) -> Response {
    let name = request.query("name").unwrap_or("world");
    Response::json(
        StatusCode::OK,
        &Greeting {
            message: format!("Hello, {name}!"),
        },
    )
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier, percent-decoded")),
    responses((status = 200, description = "Echo of the path parameter", body = UserId)),
    tag = "public"
)]
#[must_use]
pub fn user(request: &Request) -> Response {
    Response::json(
        StatusCode::OK,
        &UserId {
            user_id: request.param("id").unwrap_or_default().to_string(),
        },
    )
}

#[utoipa::path(
    post,
    path = "/echo",
    responses((status = 200, description = "The received body", body = Echo)),
    tag = "public"
)]
#[must_use]
pub fn echo(request: &Request) -> Response {
    Response::json(
        StatusCode::OK,
        &Echo {
            received: request.body.clone(),
        },
    )
}
