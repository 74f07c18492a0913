//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an [`Action`]. Without a subcommand the
//! binary behaves as a Lambda function, which is how it is deployed.

use crate::{
    api::ApiConfig,
    cli::{
        actions::{lambda, serve, Action, Deployment},
        commands::{self, cookie, cors, provider, CMD_OPENAPI, CMD_SERVE},
    },
};
use anyhow::Result;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_OPENAPI, _)) => Ok(Action::OpenApi),
        Some((CMD_SERVE, sub)) => Ok(Action::Serve(serve::Args {
            port: sub.get_one::<u16>("port").copied().unwrap_or(8080),
            deployment: deployment(matches)?,
        })),
        _ => Ok(Action::Lambda(lambda::Args {
            deployment: deployment(matches)?,
        })),
    }
}

fn deployment(matches: &clap::ArgMatches) -> Result<Deployment> {
    commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let provider_opts = provider::Options::parse(matches)?;
    let cookie_config = cookie::Options::parse(matches)?;
    let cors_policy = cors::Options::parse(matches);

    Ok(Deployment {
        idp_region: provider_opts.region,
        idp_client_id: provider_opts.client_id,
        idp_endpoint: provider_opts.endpoint,
        api: ApiConfig::new()
            .with_cookie(cookie_config)
            .with_cors(cors_policy),
    })
}
