//! Authentication proxy.
//!
//! Flow Overview:
//! 1) Decode the JSON body and check required fields.
//! 2) Forward exactly one call to the identity provider (logout makes none).
//! 3) Shape the answer; login and refresh also set the `rt` cookie.
//!
//! Provider failures are never retried. The provider's message is passed to
//! the client when it has one.

pub mod login;
pub mod logout;
pub mod password;
pub mod refresh;
pub mod signup;
pub mod types;
pub mod verify;

use crate::{
    api::{
        config::CookieConfig, cookie::refresh_cookie, request::RequestError, response::Response,
    },
    idp::{AuthenticationResult, ProviderError},
};
use anyhow::{Context, Result};
use axum::http::{header::SET_COOKIE, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use types::TokenResponse;

/// An empty string counts as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn present_secret(value: Option<SecretString>) -> Option<SecretString> {
    value.filter(|v| !v.expose_secret().is_empty())
}

fn invalid_body(error: &RequestError) -> Response {
    debug!("Rejected auth request body: {}", error);
    Response::error(StatusCode::BAD_REQUEST, "Invalid request body")
}

fn provider_failure(status: StatusCode, error: &ProviderError, fallback: &str) -> Response {
    warn!("Identity provider call failed: {}", error);
    Response::error(status, error.message_or(fallback))
}

/// 200 with the token body and the refresh cookie set to `refresh_token`.
fn issue_tokens(
    access_token: String,
    result: &AuthenticationResult,
    refresh_token: &str,
    cookie: &CookieConfig,
) -> Result<Response> {
    let set_cookie =
        refresh_cookie(refresh_token, cookie).context("Failed to build refresh cookie")?;

    let body = TokenResponse {
        access_token,
        expires_in: result.expires_in,
        id_token: result.id_token.clone(),
    };

    Ok(Response::json(StatusCode::OK, &body).with_header(SET_COOKIE, set_cookie))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_missing() {
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(Some("x".to_string())), Some("x".to_string()));
        assert!(present_secret(Some(SecretString::from(""))).is_none());
        assert!(present_secret(Some(SecretString::from("x"))).is_some());
    }

    #[test]
    fn provider_failure_prefers_provider_message() {
        let rejected = ProviderError::Rejected {
            kind: "UsernameExistsException".to_string(),
            message: Some("User already exists".to_string()),
        };
        let response = provider_failure(StatusCode::BAD_REQUEST, &rejected, "Signup failed");
        assert_eq!(response.body, r#"{"error":"User already exists"}"#);

        let transport = ProviderError::Transport("timed out".to_string());
        let response = provider_failure(StatusCode::UNAUTHORIZED, &transport, "Login failed");
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, r#"{"error":"Login failed"}"#);
    }
}
