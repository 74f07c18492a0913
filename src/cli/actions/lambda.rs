use crate::cli::{actions::Deployment, telemetry};
use anyhow::{anyhow, Result};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub deployment: Deployment,
}

/// Serve gateway proxy events until the runtime shuts the process down.
///
/// Every event gets exactly one gateway response; failures inside the router
/// are already mapped to HTTP status codes, so the handler never errors.
/// # Errors
/// Returns an error if the app cannot be built or the runtime loop fails.
pub async fn execute(args: Args) -> Result<()> {
    let app = args.deployment.app()?;
    let app = &app;

    info!("waiting for gateway events");

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| async move {
        let response = app.handle_event(event.payload).await;
        telemetry::flush();
        Ok::<_, lambda_runtime::Error>(response)
    }))
    .await
    .map_err(|e| anyhow!(e))
}
