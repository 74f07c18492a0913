//! Refresh-token cookie helpers. The token is opaque here: it is encoded,
//! decoded and forwarded, never inspected.

use super::config::CookieConfig;
use axum::http::{header::InvalidHeaderValue, HeaderValue};
use regex::Regex;
use std::borrow::Cow;

pub const REFRESH_COOKIE_NAME: &str = "rt";

/// `Set-Cookie` value carrying `token` for the configured lifetime.
///
/// # Errors
/// Returns an error if the configured domain contains bytes not allowed in a
/// header value.
pub fn refresh_cookie(
    token: &str,
    config: &CookieConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(
        REFRESH_COOKIE_NAME,
        &urlencoding::encode(token),
        config.max_age_seconds(),
        config,
    )
}

/// `Set-Cookie` value that expires the refresh cookie immediately.
///
/// # Errors
/// Returns an error if the configured domain contains bytes not allowed in a
/// header value.
pub fn clear_refresh_cookie(config: &CookieConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(REFRESH_COOKIE_NAME, "", 0, config)
}

fn set_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    config: &CookieConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}");
    if config.secure() {
        cookie.push_str("; Secure");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(config.same_site().as_str());
    cookie.push_str("; HttpOnly");
    if let Some(domain) = config.domain() {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    HeaderValue::from_str(&cookie)
}

/// Value of cookie `name` in a `Cookie` header, percent-decoded.
///
/// A value that does not decode is returned as sent.
pub fn extract(cookie_header: &str, name: &str) -> Option<String> {
    let pattern = format!(r"(?:^|;\s*){}=([^;]*)", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(cookie_header)?.get(1)?.as_str();

    Some(urlencoding::decode(value).map_or_else(|_| value.to_string(), Cow::into_owned))
}
