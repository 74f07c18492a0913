use crate::{api::response::Response, GIT_COMMIT_HASH};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    name: String,
    version: String,
    build: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses (
        (status = 200, description = "Function is up, reports its build", body = Health)
    ),
    tag = "health"
)]
// handler for health
#[must_use]
pub fn health() -> Response {
    let health = Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: GIT_COMMIT_HASH.to_string(),
    };

    let short_hash = if health.build.len() > 7 {
        &health.build[0..7]
    } else {
        ""
    };

    let response = Response::json(StatusCode::OK, &health);

    match format!("{}:{}:{}", health.name, health.version, short_hash).parse::<HeaderValue>() {
        Ok(x_app) => {
            debug!("X-App header: {:?}", x_app);
            response.with_header(HeaderName::from_static("x-app"), x_app)
        }
        Err(err) => {
            error!("Failed to parse X-App header: {}", err);
            response
        }
    }
}
