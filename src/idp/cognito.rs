//! Cognito user pool client over the `AWSCognitoIdentityProviderService` JSON API.
//!
//! Only public-client operations are used (`SignUp`, `ConfirmSignUp`,
//! `InitiateAuth`, `ChangePassword`), none of which need request signing.

use super::{
    AuthenticationResult, ChangePassword, IdentityProvider, ProviderError, SignUp,
};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthOutput {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CognitoClient {
    http: Client,
    endpoint: Url,
    client_id: String,
}

impl CognitoClient {
    /// Client for the regional Cognito endpoint.
    ///
    /// # Errors
    /// Returns an error if the region does not form a valid endpoint URL or the
    /// HTTP client cannot be built.
    pub fn new(region: &str, client_id: String) -> Result<Self> {
        let endpoint = Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))
            .with_context(|| format!("Invalid identity provider region: {region}"))?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build identity provider HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            client_id,
        })
    }

    /// Send requests to `endpoint` instead of the regional default.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[instrument(skip(self, payload), fields(idp.endpoint = %self.endpoint))]
    async fn call(&self, action: &str, payload: &Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!("Identity provider unreachable: {}", e);
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let data: Value = if text.trim().is_empty() {
            json!({})
        } else if status.is_success() {
            serde_json::from_str(&text).map_err(|e| ProviderError::Transport(e.to_string()))?
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        // Cognito flags errors with `__type`, sometimes on a 200
        if !status.is_success() || data.get("__type").is_some() {
            let kind = data
                .get("__type")
                .and_then(Value::as_str)
                .map_or_else(|| status.to_string(), error_kind);
            let message = data
                .get("message")
                .or_else(|| data.get("Message"))
                .and_then(Value::as_str)
                .map(ToString::to_string);

            debug!("{} rejected: {} - {:?}", action, kind, message);

            return Err(ProviderError::Rejected { kind, message });
        }

        Ok(data)
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: Value,
    ) -> Result<AuthenticationResult, ProviderError> {
        let payload = json!({
            "AuthFlow": flow,
            "ClientId": self.client_id,
            "AuthParameters": parameters,
        });

        let data = self.call("InitiateAuth", &payload).await?;

        let output: InitiateAuthOutput =
            serde_json::from_value(data).map_err(|e| ProviderError::Transport(e.to_string()))?;

        if let Some(challenge) = &output.challenge_name {
            debug!("{} ended in challenge {}", flow, challenge);
        }

        Ok(output.authentication_result.unwrap_or_default())
    }
}

/// `__type` is either `NotAuthorizedException` or a namespaced
/// `aws.cognito#NotAuthorizedException`.
fn error_kind(value: &str) -> String {
    value.rsplit('#').next().unwrap_or(value).to_string()
}

impl IdentityProvider for CognitoClient {
    #[instrument(skip_all)]
    async fn sign_up(&self, request: &SignUp) -> Result<(), ProviderError> {
        let payload = json!({
            "ClientId": self.client_id,
            "Username": request.email,
            "Password": request.password.expose_secret(),
            "UserAttributes": [
                { "Name": "email", "Value": request.email },
                { "Name": "given_name", "Value": request.given_name },
                { "Name": "family_name", "Value": request.family_name },
            ],
        });

        self.call("SignUp", &payload).await.map(|_| ())
    }

    #[instrument(skip_all)]
    async fn confirm_sign_up(&self, username: &str, code: &SecretString) -> Result<(), ProviderError> {
        let payload = json!({
            "ClientId": self.client_id,
            "Username": username,
            "ConfirmationCode": code.expose_secret(),
        });

        self.call("ConfirmSignUp", &payload).await.map(|_| ())
    }

    #[instrument(skip_all)]
    async fn password_auth(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthenticationResult, ProviderError> {
        self.initiate_auth(
            "USER_PASSWORD_AUTH",
            json!({
                "USERNAME": username,
                "PASSWORD": password.expose_secret(),
            }),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn refresh_auth(
        &self,
        refresh_token: &SecretString,
    ) -> Result<AuthenticationResult, ProviderError> {
        self.initiate_auth(
            "REFRESH_TOKEN_AUTH",
            json!({ "REFRESH_TOKEN": refresh_token.expose_secret() }),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn change_password(&self, request: &ChangePassword) -> Result<(), ProviderError> {
        let payload = json!({
            "AccessToken": request.access_token.expose_secret(),
            "PreviousPassword": request.previous_password.expose_secret(),
            "ProposedPassword": request.proposed_password.expose_secret(),
        });

        self.call("ChangePassword", &payload).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CognitoClient {
        CognitoClient::new("us-east-1", "test-client-id".to_string())
            .unwrap()
            .with_endpoint(Url::parse(&server.uri()).unwrap())
    }

    #[test]
    fn regional_endpoint() {
        let client = CognitoClient::new("eu-west-1", "id".to_string()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://cognito-idp.eu-west-1.amazonaws.com/"
        );
        assert_eq!(client.client_id(), "id");
    }

    #[test]
    fn error_kind_strips_namespace() {
        assert_eq!(
            error_kind("aws.cognito#UsernameExistsException"),
            "UsernameExistsException"
        );
        assert_eq!(error_kind("CodeMismatchException"), "CodeMismatchException");
    }

    #[tokio::test]
    async fn password_auth_returns_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.InitiateAuth",
            ))
            .and(header("Content-Type", AMZ_JSON))
            .and(body_partial_json(json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "ClientId": "test-client-id",
                "AuthParameters": { "USERNAME": "a@b.com", "PASSWORD": "x" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "at-1",
                    "ExpiresIn": 3600,
                    "IdToken": "it-1",
                    "RefreshToken": "rt-1",
                    "TokenType": "Bearer"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client
            .password_auth("a@b.com", &SecretString::from("x"))
            .await
            .unwrap();

        assert_eq!(result.access_token.as_deref(), Some("at-1"));
        assert_eq!(result.expires_in, Some(3600));
        assert_eq!(
            result.refresh_token.as_ref().map(ExposeSecret::expose_secret),
            Some("rt-1")
        );
    }

    #[tokio::test]
    async fn challenge_yields_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ChallengeName": "NEW_PASSWORD_REQUIRED",
                "Session": "abc"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client
            .password_auth("a@b.com", &SecretString::from("x"))
            .await
            .unwrap();

        assert!(result.access_token.is_none());
        assert!(result.refresh_token.is_none());
    }

    #[tokio::test]
    async fn rejection_forwards_provider_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.SignUp",
            ))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "UsernameExistsException",
                "message": "An account with the given email already exists."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .sign_up(&SignUp {
                email: "a@b.com".to_string(),
                password: SecretString::from("x"),
                given_name: String::new(),
                family_name: String::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::Rejected {
                kind: "UsernameExistsException".to_string(),
                message: Some("An account with the given email already exists.".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_body_has_no_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .confirm_sign_up("a@b.com", &SecretString::from("123456"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), None);
        assert!(matches!(err, ProviderError::Rejected { .. }));
    }

    #[tokio::test]
    async fn change_password_sends_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.ChangePassword",
            ))
            .and(body_partial_json(json!({
                "AccessToken": "at",
                "PreviousPassword": "old",
                "ProposedPassword": "new"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client
            .change_password(&ChangePassword {
                access_token: SecretString::from("at"),
                previous_password: SecretString::from("old"),
                proposed_password: SecretString::from("new"),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let client = CognitoClient::new("us-east-1", "id".to_string())
            .unwrap()
            .with_endpoint(Url::parse("http://127.0.0.1:9/").unwrap());

        let err = client
            .refresh_auth(&SecretString::from("rt"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
