//! In-memory identity provider for handler tests.

use super::{AuthenticationResult, ChangePassword, IdentityProvider, ProviderError, SignUp};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

/// Tokens the fake hands out; `None` fields model partial results.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl Tokens {
    pub(crate) fn issued(access: &str, refresh: Option<&str>) -> Self {
        Self {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(ToString::to_string),
            id_token: Some(format!("id-{access}")),
            expires_in: Some(3600),
        }
    }

    fn to_result(&self) -> AuthenticationResult {
        AuthenticationResult {
            access_token: self.access_token.clone(),
            expires_in: self.expires_in,
            id_token: self.id_token.clone(),
            refresh_token: self.refresh_token.clone().map(SecretString::from),
            token_type: Some("Bearer".to_string()),
        }
    }
}

/// Answers every call with `outcome` and records what it was asked.
#[derive(Debug)]
pub(crate) struct FakeProvider {
    outcome: Result<Tokens, ProviderError>,
    calls: AtomicUsize,
    last_secret: Mutex<Option<String>>,
}

impl FakeProvider {
    pub(crate) fn succeeding(tokens: Tokens) -> Self {
        Self {
            outcome: Ok(tokens),
            calls: AtomicUsize::new(0),
            last_secret: Mutex::new(None),
        }
    }

    pub(crate) fn rejecting(message: Option<&str>) -> Self {
        Self {
            outcome: Err(ProviderError::Rejected {
                kind: "NotAuthorizedException".to_string(),
                message: message.map(ToString::to_string),
            }),
            calls: AtomicUsize::new(0),
            last_secret: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Last secret handed to the provider (password, code or token).
    pub(crate) fn last_secret(&self) -> Option<String> {
        self.last_secret.lock().ok().and_then(|guard| guard.clone())
    }

    fn record(&self, secret: &SecretString) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_secret.lock() {
            *guard = Some(secret.expose_secret().to_string());
        }
    }

    fn unit(&self) -> Result<(), ProviderError> {
        self.outcome.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    fn tokens(&self) -> Result<AuthenticationResult, ProviderError> {
        self.outcome
            .as_ref()
            .map(Tokens::to_result)
            .map_err(Clone::clone)
    }
}

impl IdentityProvider for FakeProvider {
    async fn sign_up(&self, request: &SignUp) -> Result<(), ProviderError> {
        self.record(&request.password);
        self.unit()
    }

    async fn confirm_sign_up(&self, _username: &str, code: &SecretString) -> Result<(), ProviderError> {
        self.record(code);
        self.unit()
    }

    async fn password_auth(
        &self,
        _username: &str,
        password: &SecretString,
    ) -> Result<AuthenticationResult, ProviderError> {
        self.record(password);
        self.tokens()
    }

    async fn refresh_auth(
        &self,
        refresh_token: &SecretString,
    ) -> Result<AuthenticationResult, ProviderError> {
        self.record(refresh_token);
        self.tokens()
    }

    async fn change_password(&self, request: &ChangePassword) -> Result<(), ProviderError> {
        self.record(&request.proposed_password);
        self.unit()
    }
}
