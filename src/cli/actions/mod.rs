pub mod lambda;
pub mod openapi;
pub mod serve;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    api::{ApiConfig, App},
    idp::cognito::CognitoClient,
};
use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub enum Action {
    Lambda(lambda::Args),
    Serve(serve::Args),
    OpenApi,
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Settings shared by every action that answers requests.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub idp_region: String,
    pub idp_client_id: String,
    pub idp_endpoint: Option<Url>,
    pub api: ApiConfig,
}

impl Deployment {
    /// Build the request dispatcher backed by the configured user pool.
    ///
    /// # Errors
    /// Returns an error if the identity provider client cannot be built.
    pub fn app(self) -> Result<App<CognitoClient>> {
        let mut client = CognitoClient::new(&self.idp_region, self.idp_client_id)
            .context("failed to build identity provider client")?;

        if let Some(endpoint) = self.idp_endpoint {
            client = client.with_endpoint(endpoint);
        }

        debug!(endpoint = %client.endpoint(), "identity provider configured");

        Ok(App::new(self.api, client))
    }
}
