use super::{
    issue_tokens, provider_failure,
    types::{ErrorResponse, TokenResponse},
};
use crate::{
    api::{cookie::REFRESH_COOKIE_NAME, request::Request, response::Response, App},
    idp::IdentityProvider,
};
use anyhow::Result;
use axum::http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

/// Trade the `rt` cookie for a new access token. The token is read from the
/// cookie only, never from the body.
///
/// # Errors
/// Returns an error if the refresh cookie cannot be built.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New access token; `rt` cookie re-issued", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "rt refresh-token cookie"))),
        (status = 401, description = "Missing or rejected refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh<P: IdentityProvider>(app: &App<P>, request: &Request) -> Result<Response> {
    let Some(current) = request
        .cookie(REFRESH_COOKIE_NAME)
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
    else {
        return Ok(Response::error(StatusCode::UNAUTHORIZED, "Missing refresh token"));
    };

    let result = match app.provider().refresh_auth(&current).await {
        Ok(result) => result,
        Err(e) => {
            return Ok(provider_failure(
                StatusCode::UNAUTHORIZED,
                &e,
                "Failed to refresh token",
            ))
        }
    };

    let Some(access_token) = result.access_token.clone().filter(|t| !t.is_empty()) else {
        return Ok(Response::error(StatusCode::UNAUTHORIZED, "Invalid refresh"));
    };

    // The provider may rotate the refresh token; keep the current one otherwise.
    let refresh_token = result
        .refresh_token
        .as_ref()
        .map(|t| t.expose_secret())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| current.expose_secret());

    issue_tokens(access_token, &result, refresh_token, app.config().cookie())
}
