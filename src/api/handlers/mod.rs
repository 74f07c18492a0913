//! Route handlers.
//!
//! Each [`Endpoint`] maps to one function here. Handlers receive the matched
//! request with its params filled in and return a complete [`Response`];
//! CORS headers are added afterwards by [`App::handle`].

pub mod auth;
pub mod health;
pub mod me;
pub mod public;

use super::{request::Request, response::Response, router::Endpoint, App};
use crate::idp::IdentityProvider;
use anyhow::Result;

pub(crate) async fn dispatch<P: IdentityProvider>(
    app: &App<P>,
    endpoint: Endpoint,
    request: &Request,
) -> Result<Response> {
    let response = match endpoint {
        Endpoint::Health => health::health(),
        Endpoint::Ping => public::ping(),
        Endpoint::Me => me::me(request),
        Endpoint::Hello => public::hello(request),
        Endpoint::User => public::user(request),
        Endpoint::Echo => public::echo(request),
        Endpoint::Signup => auth::signup::signup(app, request).await,
        Endpoint::Verify => auth::verify::verify(app, request).await,
        Endpoint::Login => auth::login::login(app, request).await?,
        Endpoint::Refresh => auth::refresh::refresh(app, request).await?,
        Endpoint::ChangePassword => auth::password::change_password(app, request).await,
        Endpoint::Logout => auth::logout::logout(app)?,
    };

    Ok(response)
}
