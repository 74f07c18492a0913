use crate::api::CorsPolicy;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_CORS_ALLOW_ORIGIN: &str = "cors-allow-origin";

pub struct Options;

impl Options {
    /// No origins means any origin without credentials; listed origins get
    /// credentialed CORS.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> CorsPolicy {
        let origins: Vec<String> = matches
            .get_many::<String>(ARG_CORS_ALLOW_ORIGIN)
            .map(|values| {
                values
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if origins.is_empty() {
            CorsPolicy::Open
        } else {
            CorsPolicy::Credentialed { origins }
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CORS_ALLOW_ORIGIN)
            .long(ARG_CORS_ALLOW_ORIGIN)
            .help("Origin allowed to send credentialed requests (repeatable or comma separated)")
            .long_help(
                "Origin allowed to send credentialed requests, e.g. https://app.example.com.\n\nWhen unset every origin is allowed and credentials are not.",
            )
            .env("RESTGATE_CORS_ALLOW_ORIGIN")
            .action(ArgAction::Append)
            .value_delimiter(',')
            .global(true),
    )
}
