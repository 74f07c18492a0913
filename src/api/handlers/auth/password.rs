use super::{
    invalid_body, present_secret, provider_failure,
    types::{ChangePasswordRequest, ErrorResponse, MessageResponse},
};
use crate::{
    api::{request::Request, response::Response, App},
    idp::{ChangePassword, IdentityProvider},
};
use axum::http::StatusCode;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing fields or rejected by the identity provider", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn change_password<P: IdentityProvider>(app: &App<P>, request: &Request) -> Response {
    let body: ChangePasswordRequest = match request.json() {
        Ok(body) => body,
        Err(e) => return invalid_body(&e),
    };

    let (Some(access_token), Some(previous_password), Some(proposed_password)) = (
        present_secret(body.access_token),
        present_secret(body.previous_password),
        present_secret(body.proposed_password),
    ) else {
        return Response::error(StatusCode::BAD_REQUEST, "Missing fields");
    };

    let change = ChangePassword {
        access_token,
        previous_password,
        proposed_password,
    };

    match app.provider().change_password(&change).await {
        Ok(()) => Response::json(
            StatusCode::OK,
            &MessageResponse::ok("Password changed successfully."),
        ),
        Err(e) => provider_failure(StatusCode::BAD_REQUEST, &e, "Failed to change password"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{app, post};
    use super::*;
    use crate::idp::test_support::{FakeProvider, Tokens};
    use serde_json::json;

    fn full_body() -> serde_json::Value {
        json!({
            "accessToken": "at",
            "previousPassword": "old-pw",
            "proposedPassword": "new-pw"
        })
    }

    #[tokio::test]
    async fn change_password_succeeds() {
        let app = app(FakeProvider::succeeding(Tokens::default()));
        let response = change_password(&app, &post("/auth/change-password", &full_body())).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json_body(),
            Some(json!({ "ok": true, "message": "Password changed successfully." }))
        );
        assert_eq!(app.provider().last_secret().as_deref(), Some("new-pw"));
    }

    #[tokio::test]
    async fn any_missing_field_skips_provider() {
        let app = app(FakeProvider::succeeding(Tokens::default()));
        for missing in ["accessToken", "previousPassword", "proposedPassword"] {
            let mut body = full_body();
            if let Some(fields) = body.as_object_mut() {
                fields.remove(missing);
            }
            let response = change_password(&app, &post("/auth/change-password", &body)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.json_body(), Some(json!({ "error": "Missing fields" })));
        }
        assert_eq!(app.provider().calls(), 0);
    }

    #[tokio::test]
    async fn rejected_change() {
        let app = app(FakeProvider::rejecting(Some("Incorrect username or password.")));
        let response = change_password(&app, &post("/auth/change-password", &full_body())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json_body(),
            Some(json!({ "error": "Incorrect username or password." }))
        );

        let app = super::super::testing::app(FakeProvider::rejecting(None));
        let response = change_password(&app, &post("/auth/change-password", &full_body())).await;
        assert_eq!(
            response.json_body(),
            Some(json!({ "error": "Failed to change password" }))
        );
    }
}
