use super::{
    invalid_body, present, present_secret, provider_failure,
    types::{ErrorResponse, MessageResponse, SignupRequest},
};
use crate::{
    api::{request::Request, response::Response, App},
    idp::{IdentityProvider, SignUp},
};
use axum::http::StatusCode;
use tracing::instrument;

/// Register an account; the provider sends the confirmation code.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, email verification pending", body = MessageResponse),
        (status = 400, description = "Missing fields or rejected by the identity provider", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signup<P: IdentityProvider>(app: &App<P>, request: &Request) -> Response {
    let body: SignupRequest = match request.json() {
        Ok(body) => body,
        Err(e) => return invalid_body(&e),
    };

    let (Some(email), Some(password)) = (present(body.email), present_secret(body.password))
    else {
        return Response::error(StatusCode::BAD_REQUEST, "Missing email or password");
    };

    let sign_up = SignUp {
        email,
        password,
        given_name: body.first_name.unwrap_or_default(),
        family_name: body.last_name.unwrap_or_default(),
    };

    match app.provider().sign_up(&sign_up).await {
        Ok(()) => Response::json(
            StatusCode::OK,
            &MessageResponse::ok("Signup successful. Please verify email."),
        ),
        Err(e) => provider_failure(StatusCode::BAD_REQUEST, &e, "Signup failed"),
    }
}
