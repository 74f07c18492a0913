use super::{
    invalid_body, issue_tokens, present, present_secret, provider_failure,
    types::{ErrorResponse, LoginRequest, TokenResponse},
};
use crate::{
    api::{request::Request, response::Response, App},
    idp::IdentityProvider,
};
use anyhow::Result;
use axum::http::StatusCode;
use secrecy::ExposeSecret;
use tracing::{info, instrument};

/// Password login. The refresh token goes to the `rt` cookie only.
///
/// # Errors
/// Returns an error if the refresh cookie cannot be built.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; `rt` cookie set", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "rt refresh-token cookie"))),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials or an unfinished challenge", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login<P: IdentityProvider>(app: &App<P>, request: &Request) -> Result<Response> {
    let body: LoginRequest = match request.json() {
        Ok(body) => body,
        Err(e) => return Ok(invalid_body(&e)),
    };

    let (Some(email), Some(password)) = (present(body.email), present_secret(body.password))
    else {
        return Ok(Response::error(StatusCode::BAD_REQUEST, "Missing credentials"));
    };

    let result = match app.provider().password_auth(&email, &password).await {
        Ok(result) => result,
        Err(e) => return Ok(provider_failure(StatusCode::UNAUTHORIZED, &e, "Login failed")),
    };

    let access_token = result.access_token.clone().filter(|t| !t.is_empty());
    let refresh_token = result
        .refresh_token
        .as_ref()
        .map(|t| t.expose_secret())
        .filter(|t| !t.is_empty());

    let (Some(access_token), Some(refresh_token)) = (access_token, refresh_token) else {
        info!("Login did not yield tokens, a challenge may be pending");
        return Ok(Response::error(StatusCode::UNAUTHORIZED, "Invalid login"));
    };

    issue_tokens(access_token, &result, refresh_token, app.config().cookie())
}
