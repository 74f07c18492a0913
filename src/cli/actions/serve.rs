use crate::{api, cli::actions::Deployment};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub deployment: Deployment,
}

/// Run the local development server.
/// # Errors
/// Returns an error if the app cannot be built or the listener fails.
pub async fn execute(args: Args) -> Result<()> {
    debug!(port = args.port, config = ?args.deployment.api, "starting dev server");

    let app = Arc::new(args.deployment.app()?);

    api::serve(args.port, app).await
}
