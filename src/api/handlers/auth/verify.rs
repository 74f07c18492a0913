use super::{
    invalid_body, present, present_secret, provider_failure,
    types::{ErrorResponse, MessageResponse, VerifyRequest},
};
use crate::{
    api::{request::Request, response::Response, App},
    idp::IdentityProvider,
};
use axum::http::StatusCode;
use tracing::instrument;

/// Confirm an account with the code the provider emailed.
#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Missing fields or invalid code", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify<P: IdentityProvider>(app: &App<P>, request: &Request) -> Response {
    let body: VerifyRequest = match request.json() {
        Ok(body) => body,
        Err(e) => return invalid_body(&e),
    };

    let (Some(email), Some(code)) = (present(body.email), present_secret(body.code)) else {
        return Response::error(StatusCode::BAD_REQUEST, "Missing email or code");
    };

    match app.provider().confirm_sign_up(&email, &code).await {
        Ok(()) => Response::json(
            StatusCode::OK,
            &MessageResponse::ok("Email verified successfully."),
        ),
        Err(e) => provider_failure(StatusCode::BAD_REQUEST, &e, "Verification failed"),
    }
}
