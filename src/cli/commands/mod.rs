pub mod cookie;
pub mod cors;
pub mod logging;
pub mod provider;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

use self::{
    cookie::{ARG_COOKIE_DOMAIN, ARG_COOKIE_SAME_SITE, ARG_COOKIE_SECURE},
    provider::ARG_IDP_ENDPOINT,
};

pub const CMD_LAMBDA: &str = "lambda";
pub const CMD_SERVE: &str = "serve";
pub const CMD_OPENAPI: &str = "openapi";

/// Validate argument combinations clap cannot express on its own.
///
/// # Errors
/// Returns an error string if `SameSite=None` is requested without `Secure`,
/// the cookie domain cannot be a `Domain` attribute, or the identity provider
/// endpoint is not an HTTP(S) URL.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let same_site_none = matches
        .get_one::<String>(ARG_COOKIE_SAME_SITE)
        .is_some_and(|value| value.eq_ignore_ascii_case("none"));

    if same_site_none && !matches.get_flag(ARG_COOKIE_SECURE) {
        return Err(format!(
            "--{ARG_COOKIE_SAME_SITE} none requires --{ARG_COOKIE_SECURE} (browsers reject insecure SameSite=None cookies)"
        ));
    }

    if let Some(domain) = matches.get_one::<String>(ARG_COOKIE_DOMAIN) {
        if domain
            .chars()
            .any(|c| c == ';' || c.is_whitespace() || c.is_control())
        {
            return Err(format!(
                "--{ARG_COOKIE_DOMAIN} must not contain ';', whitespace or control characters, got: {domain:?}"
            ));
        }
    }

    if let Some(endpoint) = matches
        .get_one::<String>(ARG_IDP_ENDPOINT)
        .filter(|v| !v.trim().is_empty())
    {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(format!(
                "--{ARG_IDP_ENDPOINT} must be an http:// or https:// URL, got: {endpoint}"
            ));
        }
    }

    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("restgate")
        .about("Serverless REST API router and auth proxy")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand(
            Command::new(CMD_LAMBDA)
                .about("Serve gateway proxy events from the Lambda runtime (default)"),
        )
        .subcommand(
            Command::new(CMD_SERVE)
                .about("Run a local HTTP server that routes like the deployed function")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on")
                        .default_value("8080")
                        .env("RESTGATE_PORT")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(Command::new(CMD_OPENAPI).about("Print the OpenAPI document as JSON"));

    let command = provider::with_args(command);
    let command = cookie::with_args(command);
    let command = cors::with_args(command);
    logging::with_args(command)
}
