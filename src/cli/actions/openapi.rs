use crate::api::openapi::openapi;
use anyhow::Result;

/// Print the OpenAPI document to stdout.
/// # Errors
/// Returns an error if the document cannot be serialized.
pub fn execute() -> Result<()> {
    let json = serde_json::to_string_pretty(&openapi())?;
    println!("{json}");
    Ok(())
}
