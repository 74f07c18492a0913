use crate::api::{CookieConfig, SameSite};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_COOKIE_DOMAIN: &str = "cookie-domain";
pub const ARG_COOKIE_SAME_SITE: &str = "cookie-same-site";
pub const ARG_COOKIE_MAX_AGE: &str = "cookie-max-age";

pub struct Options;

impl Options {
    /// Parse refresh-cookie arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the `SameSite` value is unknown or the max age is
    /// negative.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<CookieConfig> {
        let same_site = matches
            .get_one::<String>(ARG_COOKIE_SAME_SITE)
            .map(|value| value.parse::<SameSite>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?
            .unwrap_or_default();

        let max_age = matches
            .get_one::<i64>(ARG_COOKIE_MAX_AGE)
            .copied()
            .unwrap_or(2_592_000);
        if max_age < 0 {
            anyhow::bail!("--{ARG_COOKIE_MAX_AGE} must not be negative");
        }

        Ok(CookieConfig::default()
            .with_secure(matches.get_flag(ARG_COOKIE_SECURE))
            .with_same_site(same_site)
            .with_domain(matches.get_one::<String>(ARG_COOKIE_DOMAIN).cloned())
            .with_max_age_seconds(max_age))
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the refresh cookie Secure (HTTPS only)")
                .env("RESTGATE_COOKIE_SECURE")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_DOMAIN)
                .long(ARG_COOKIE_DOMAIN)
                .help("Domain attribute of the refresh cookie")
                .env("RESTGATE_COOKIE_DOMAIN")
                .global(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_SAME_SITE)
                .long(ARG_COOKIE_SAME_SITE)
                .help("SameSite attribute of the refresh cookie")
                .long_help(
                    "SameSite attribute of the refresh cookie.\n\nUse `none` for cross-site frontends; it requires --cookie-secure.",
                )
                .env("RESTGATE_COOKIE_SAME_SITE")
                .default_value("lax")
                .value_parser(["lax", "strict", "none"])
                .ignore_case(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_MAX_AGE)
                .long(ARG_COOKIE_MAX_AGE)
                .help("Refresh cookie lifetime in seconds")
                .env("RESTGATE_COOKIE_MAX_AGE")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64))
                .global(true),
        )
}
