//! # Restgate (serverless REST API router and auth proxy)
//!
//! `restgate` is the compute function behind an API gateway. Each invocation
//! receives one proxy event, normalizes it into a [`api::Request`], routes it
//! through a static route table and returns exactly one gateway response.
//!
//! ## Routing
//!
//! Routes are `method + template` pairs where `:name` segments capture one
//! path segment. The first template that matches both path and method wins.
//! A path that matches only with other methods yields `405` with an `Allow`
//! header; a path that matches nothing yields `404`.
//!
//! ## Authentication
//!
//! Credentials never stay here. The `/auth/*` endpoints forward a single call
//! to the configured identity provider and translate the result. The only
//! client-side state is the opaque refresh token, kept in the `rt` cookie.
//! Identity claims for protected routes are trusted as delivered by the
//! upstream gateway authorizer.

pub mod api;
pub mod cli;
pub mod idp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
