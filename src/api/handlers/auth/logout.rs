use crate::{
    api::{cookie::clear_refresh_cookie, response::Response, App},
    idp::IdentityProvider,
};
use anyhow::{Context, Result};
use axum::http::{header::SET_COOKIE, StatusCode};

/// Clear the `rt` cookie. No provider call is made, so the refresh token
/// stays valid upstream until it expires.
///
/// # Errors
/// Returns an error if the clearing cookie cannot be built.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Cookie cleared",
            headers(("Set-Cookie" = String, description = "Expired rt cookie")))
    ),
    tag = "auth"
)]
pub fn logout<P: IdentityProvider>(app: &App<P>) -> Result<Response> {
    let clear = clear_refresh_cookie(app.config().cookie())
        .context("Failed to build clearing cookie")?;

    Ok(Response::empty(StatusCode::NO_CONTENT).with_header(SET_COOKIE, clear))
}
