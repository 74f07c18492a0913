//! Identity of the caller, as asserted by the gateway authorizer.
//!
//! Claims are trusted as delivered; nothing here validates a token.

use crate::api::{request::Request, response::Response};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Absent claims are left out of the body rather than sent as `null`.
#[derive(ToSchema, Serialize, Debug, Default)]
pub struct MeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub sub: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub username: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub scope: Option<Value>,
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Claims of the authenticated caller.", body = MeResponse),
        (status = 401, description = "No authorizer claims on the request."),
    ),
    tag = "me"
)]
#[must_use]
pub fn me(request: &Request) -> Response {
    let Some(claims) = &request.claims else {
        return Response::error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let claim = |name: &str| claims.get(name).filter(|v| !v.is_null()).cloned();

    Response::json(
        StatusCode::OK,
        &MeResponse {
            sub: claim("sub"),
            username: claim("cognito:username"),
            email: claim("email"),
            scope: claim("scope"),
        },
    )
}
