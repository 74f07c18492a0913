//! Identity provider connection arguments.

use clap::{Arg, ArgMatches, Command};
use std::env::var;
use url::Url;

pub const ARG_IDP_REGION: &str = "idp-region";
pub const ARG_IDP_CLIENT_ID: &str = "idp-client-id";
pub const ARG_IDP_ENDPOINT: &str = "idp-endpoint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub region: String,
    pub client_id: String,
    pub endpoint: Option<Url>,
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// The region falls back to `AWS_REGION`, which the Lambda runtime always
    /// sets.
    ///
    /// # Errors
    /// Returns an error if the region or client id is missing, or the endpoint
    /// is not a URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(region) = get_non_empty(ARG_IDP_REGION)
            .or_else(|| var("AWS_REGION").ok().filter(|v| !v.trim().is_empty()))
        else {
            anyhow::bail!("missing required argument: --{ARG_IDP_REGION}");
        };

        let Some(client_id) = get_non_empty(ARG_IDP_CLIENT_ID) else {
            anyhow::bail!("missing required argument: --{ARG_IDP_CLIENT_ID}");
        };

        let endpoint = get_non_empty(ARG_IDP_ENDPOINT)
            .map(|endpoint| Url::parse(&endpoint))
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid --{ARG_IDP_ENDPOINT}: {e}"))?;

        Ok(Self {
            region,
            client_id,
            endpoint,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDP_REGION)
                .long(ARG_IDP_REGION)
                .help("Region of the identity provider user pool")
                .long_help(
                    "Region of the identity provider user pool.\n\nFalls back to AWS_REGION when unset.",
                )
                .env("RESTGATE_IDP_REGION")
                .global(true),
        )
        .arg(
            Arg::new(ARG_IDP_CLIENT_ID)
                .long(ARG_IDP_CLIENT_ID)
                .help("Public app client id of the user pool")
                .env("RESTGATE_IDP_CLIENT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_IDP_ENDPOINT)
                .long(ARG_IDP_ENDPOINT)
                .help("Override the identity provider endpoint URL")
                .long_help(
                    "Override the identity provider endpoint URL, e.g. a local emulator.\n\nDefaults to https://cognito-idp.<region>.amazonaws.com/",
                )
                .env("RESTGATE_IDP_ENDPOINT")
                .global(true),
        )
}
