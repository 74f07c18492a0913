//! Outbound response and cross-origin headers.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, VARY,
    },
    HeaderMap, HeaderName, HeaderValue, StatusCode,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// HTTP-shaped result of one invocation. The body is always a string.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    /// Serialize `data` as the JSON body. A value that fails to serialize
    /// becomes a generic 500.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::typed(status, JSON_CONTENT_TYPE, body),
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::internal_error()
            }
        }
    }

    #[must_use]
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::typed(status, TEXT_CONTENT_TYPE, body.to_string())
    }

    fn typed(status: StatusCode, content_type: &'static str, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({ "error": message }).to_string();
        Self::typed(status, JSON_CONTENT_TYPE, body)
    }

    #[must_use]
    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Body parsed back into JSON, mostly useful in tests.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Cross-origin policy of a deployment. The two variants are never combined:
/// a wildcard origin cannot be paired with credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, no credentials.
    #[default]
    Open,
    /// Echo an allowed origin and permit cookies.
    Credentialed { origins: Vec<String> },
}

impl CorsPolicy {
    /// Baseline headers for a response to a request from `origin`.
    #[must_use]
    pub fn headers(&self, origin: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match self {
            Self::Open => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
                headers.insert(
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
                );
                headers.insert(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type,Authorization"),
                );
            }
            Self::Credentialed { origins } => {
                let allowed = origin
                    .filter(|o| origins.iter().any(|allowed| allowed == o))
                    .or_else(|| origins.first().map(String::as_str));

                if let Some(value) = allowed.and_then(|o| HeaderValue::from_str(o).ok()) {
                    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
                }
                headers.insert(
                    ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
                headers.insert(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("content-type,authorization,x-csrf"),
                );
                headers.insert(
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET,POST,OPTIONS"),
                );
                headers.insert(VARY, HeaderValue::from_static("Origin"));
            }
        }

        headers
    }

    /// Merge the baseline headers into `response`; headers the handler already
    /// set are left untouched.
    pub fn apply(&self, response: &mut Response, origin: Option<&str>) {
        for (name, value) in &self.headers(origin) {
            if !response.headers.contains_key(name) {
                response.headers.insert(name.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(response: &'a Response, name: &HeaderName) -> Option<&'a str> {
        response.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn json_sets_content_type() {
        let response = Response::json(StatusCode::OK, &json!({ "pong": true }));
        assert_eq!(header(&response, &CONTENT_TYPE), Some("application/json"));
        assert_eq!(response.body, r#"{"pong":true}"#);
    }

    #[test]
    fn text_sets_plain_content_type() {
        let response = Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        assert_eq!(
            header(&response, &CONTENT_TYPE),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(response.body, "Method Not Allowed");
    }

    #[test]
    fn internal_error_is_generic() {
        let response = Response::internal_error();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json_body(),
            Some(json!({ "error": "Internal Server Error" }))
        );
    }

    #[test]
    fn open_policy_allows_any_origin() {
        let mut response = Response::empty(StatusCode::NO_CONTENT);
        CorsPolicy::Open.apply(&mut response, Some("https://app.example.com"));

        assert_eq!(header(&response, &ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_METHODS),
            Some("GET,POST,PUT,PATCH,DELETE,OPTIONS")
        );
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_HEADERS),
            Some("Content-Type,Authorization")
        );
        assert!(response
            .headers
            .get(ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[test]
    fn credentialed_policy_echoes_allowed_origin() {
        let policy = CorsPolicy::Credentialed {
            origins: vec![
                "http://localhost:8080".to_string(),
                "https://app.example.com".to_string(),
            ],
        };

        let mut response = Response::empty(StatusCode::OK);
        policy.apply(&mut response, Some("https://app.example.com"));
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("https://app.example.com")
        );
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some("true")
        );
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_HEADERS),
            Some("content-type,authorization,x-csrf")
        );
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_METHODS),
            Some("GET,POST,OPTIONS")
        );
        assert_eq!(header(&response, &VARY), Some("Origin"));
    }

    #[test]
    fn credentialed_policy_never_echoes_unknown_origin() {
        let policy = CorsPolicy::Credentialed {
            origins: vec!["http://localhost:8080".to_string()],
        };

        let mut response = Response::empty(StatusCode::OK);
        policy.apply(&mut response, Some("https://evil.example.com"));
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn handler_headers_win_over_baseline() {
        let mut response = Response::empty(StatusCode::OK).with_header(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://pinned.example.com"),
        );
        CorsPolicy::Open.apply(&mut response, None);
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("https://pinned.example.com")
        );
        assert_eq!(
            header(&response, &ACCESS_CONTROL_ALLOW_HEADERS),
            Some("Content-Type,Authorization")
        );
    }
}
