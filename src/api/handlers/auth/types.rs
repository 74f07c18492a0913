//! Request/response types for auth endpoints.
//!
//! Every request field is optional so a missing field is reported with the
//! endpoint's own message instead of a generic decode error.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct VerifyRequest {
    pub email: Option<String>,
    #[schema(value_type = Option<String>)]
    pub code: Option<SecretString>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[schema(value_type = Option<String>)]
    pub access_token: Option<SecretString>,
    #[schema(value_type = Option<String>, format = Password)]
    pub previous_password: Option<SecretString>,
    #[schema(value_type = Option<String>, format = Password)]
    pub proposed_password: Option<SecretString>,
}

/// Body of a successful login or refresh. The refresh token itself only
/// travels in the `rt` cookie.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn ok(message: &str) -> Self {
        Self {
            ok: true,
            message: message.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
