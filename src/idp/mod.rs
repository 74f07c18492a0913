//! Identity provider seam.
//!
//! Handlers only talk to [`IdentityProvider`]; the process builds one concrete
//! client at startup and passes it in. [`cognito::CognitoClient`] is the
//! production implementation.

pub mod cognito;
#[cfg(test)]
pub(crate) mod test_support;

pub use cognito::CognitoClient;

use secrecy::SecretString;
use serde::Deserialize;
use std::future::Future;

/// Account creation request.
#[derive(Debug)]
pub struct SignUp {
    pub email: String,
    pub password: SecretString,
    pub given_name: String,
    pub family_name: String,
}

/// Password change on behalf of the holder of `access_token`.
#[derive(Debug)]
pub struct ChangePassword {
    pub access_token: SecretString,
    pub previous_password: SecretString,
    pub proposed_password: SecretString,
}

/// Tokens issued by the provider. Every field is optional because a flow that
/// ends in a challenge carries no tokens at all.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached or answered with something unreadable.
    #[error("identity provider request failed: {0}")]
    Transport(String),

    /// The provider answered and refused the operation.
    #[error("identity provider rejected request: {kind}")]
    Rejected {
        kind: String,
        message: Option<String>,
    },
}

impl ProviderError {
    /// Message supplied by the provider, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            Self::Transport(_) => None,
        }
    }

    /// Provider message, or `fallback` when the provider gave none.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message().unwrap_or(fallback)
    }
}

/// Operations the auth proxy forwards. Each call is made at most once per
/// invocation and never retried.
pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, request: &SignUp) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn confirm_sign_up(
        &self,
        username: &str,
        code: &SecretString,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn password_auth(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthenticationResult, ProviderError>> + Send;

    fn refresh_auth(
        &self,
        refresh_token: &SecretString,
    ) -> impl Future<Output = Result<AuthenticationResult, ProviderError>> + Send;

    fn change_password(
        &self,
        request: &ChangePassword,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_error_forwards_message() {
        let err = ProviderError::Rejected {
            kind: "NotAuthorizedException".to_string(),
            message: Some("Incorrect username or password.".to_string()),
        };
        assert_eq!(err.message(), Some("Incorrect username or password."));
        assert_eq!(err.message_or("Login failed"), "Incorrect username or password.");
    }

    #[test]
    fn empty_or_transport_errors_use_fallback() {
        let empty = ProviderError::Rejected {
            kind: "InternalErrorException".to_string(),
            message: Some(String::new()),
        };
        assert_eq!(empty.message_or("Signup failed"), "Signup failed");

        let transport = ProviderError::Transport("connection refused".to_string());
        assert_eq!(transport.message(), None);
        assert_eq!(transport.message_or("Login failed"), "Login failed");
    }

    #[test]
    fn authentication_result_decodes_pascal_case() -> Result<(), serde_json::Error> {
        let result: AuthenticationResult = serde_json::from_value(serde_json::json!({
            "AccessToken": "at",
            "ExpiresIn": 3600,
            "IdToken": "it",
            "TokenType": "Bearer"
        }))?;
        assert_eq!(result.access_token.as_deref(), Some("at"));
        assert_eq!(result.expires_in, Some(3600));
        assert_eq!(result.id_token.as_deref(), Some("it"));
        assert!(result.refresh_token.is_none());
        Ok(())
    }
}
