//! Static route table and path matching.

use axum::http::Method;
use std::collections::HashMap;

pub type Params = HashMap<String, String>;

/// Handler a route dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Ping,
    Me,
    Hello,
    User,
    Echo,
    Signup,
    Verify,
    Login,
    Refresh,
    ChangePassword,
    Logout,
}

#[derive(Debug)]
pub struct Route {
    pub method: Method,
    pub template: &'static str,
    pub endpoint: Endpoint,
}

const fn route(method: Method, template: &'static str, endpoint: Endpoint) -> Route {
    Route {
        method,
        template,
        endpoint,
    }
}

/// Every route the function serves, in match order.
pub static ROUTES: [Route; 12] = [
    route(Method::GET, "/health", Endpoint::Health),
    route(Method::GET, "/public/ping", Endpoint::Ping),
    route(Method::GET, "/me", Endpoint::Me),
    route(Method::GET, "/hello", Endpoint::Hello),
    route(Method::GET, "/users/:id", Endpoint::User),
    route(Method::POST, "/echo", Endpoint::Echo),
    route(Method::POST, "/auth/signup", Endpoint::Signup),
    route(Method::POST, "/auth/verify", Endpoint::Verify),
    route(Method::POST, "/auth/login", Endpoint::Login),
    route(Method::POST, "/auth/refresh", Endpoint::Refresh),
    route(Method::POST, "/auth/change-password", Endpoint::ChangePassword),
    route(Method::POST, "/auth/logout", Endpoint::Logout),
];

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Matched { endpoint: Endpoint, params: Params },
    NotFound,
    /// The path exists under other methods, listed once each in table order.
    MethodNotAllowed { allow: Vec<Method> },
}

/// Match `path` against `template`. Leading and trailing slashes are ignored,
/// `:name` segments capture one percent-decoded segment and literal segments
/// compare case-sensitively.
#[must_use]
pub fn match_path(template: &str, path: &str) -> Option<Params> {
    let expected: Vec<&str> = template.trim_matches('/').split('/').collect();
    let actual: Vec<&str> = path.trim_matches('/').split('/').collect();

    if expected.len() != actual.len() {
        return None;
    }

    let mut params = Params::new();
    for (want, got) in expected.iter().zip(&actual) {
        if let Some(name) = want.strip_prefix(':') {
            let value = urlencoding::decode(got)
                .map_or_else(|_| (*got).to_string(), |decoded| decoded.into_owned());
            params.insert(name.to_string(), value);
        } else if want != got {
            return None;
        }
    }

    Some(params)
}

/// First route whose template and method both match wins.
#[must_use]
pub fn resolve(routes: &[Route], method: &Method, path: &str) -> Resolution {
    let mut allow: Vec<Method> = Vec::new();

    for route in routes {
        let Some(params) = match_path(route.template, path) else {
            continue;
        };
        if route.method == *method {
            return Resolution::Matched {
                endpoint: route.endpoint,
                params,
            };
        }
        if !allow.contains(&route.method) {
            allow.push(route.method.clone());
        }
    }

    if allow.is_empty() {
        Resolution::NotFound
    } else {
        Resolution::MethodNotAllowed { allow }
    }
}
