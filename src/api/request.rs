//! Canonical inbound request, independent of the gateway payload format.

use super::cookie;
use axum::http::{header::COOKIE, request::Parts, HeaderMap, Method};
use base64ct::{Base64, Encoding};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Identity assertion decoded by the upstream authorizer.
pub type Claims = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Request body is not a JSON object")]
    NotAnObject,
}

/// One inbound call. Header keys are lowercase.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    /// `null`, parsed JSON, or the raw body string.
    pub body: Value,
    /// `None` means no authenticated identity.
    pub claims: Option<Claims>,
    /// The event as received, `null` when the request did not come from a gateway.
    pub raw: Value,
}

/// Fields pulled out of a gateway event before normalization.
#[derive(Debug, Default)]
pub(crate) struct EventParts {
    pub method: Option<String>,
    pub path: Option<String>,
    pub query: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub cookies: Option<Vec<String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub claims: Option<Claims>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: HashMap::new(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: Value::Null,
            claims: None,
            raw: Value::Null,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    /// Attach a raw body, parsed the same way as a gateway body.
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = parse_body(Some(body.to_string()), false, self.header("content-type"));
        self
    }

    #[must_use]
    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = Some(claims);
        self
    }

    pub(crate) fn from_event_parts(parts: EventParts, raw: Value) -> Result<Self, RequestError> {
        let method = match parts.method.as_deref() {
            Some(method) => Method::from_bytes(method.to_uppercase().as_bytes())
                .map_err(|_| RequestError::InvalidMethod(method.to_string()))?,
            None => Method::GET,
        };

        let path = parts.path.unwrap_or_else(|| "/".to_string());

        let mut headers = lowercase_keys(parts.headers.unwrap_or_default());
        if let Some(cookies) = parts.cookies.filter(|c| !c.is_empty()) {
            headers
                .entry("cookie".to_string())
                .or_insert_with(|| cookies.join("; "));
        }

        let body = parse_body(
            parts.body,
            parts.is_base64_encoded,
            headers.get("content-type").map(String::as_str),
        );

        Ok(Self {
            method,
            path,
            query: parts.query.unwrap_or_default(),
            headers,
            params: HashMap::new(),
            body,
            claims: parts.claims,
            raw,
        })
    }

    /// Build a request from a plain HTTP call, as the development server
    /// receives it. There is no authorizer in front, so claims are `None`.
    #[must_use]
    pub fn from_http(parts: &Parts, body: &[u8]) -> Self {
        let query = parts
            .uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let headers = flatten_headers(&parts.headers);

        let body = parse_body(
            Some(String::from_utf8_lossy(body).into_owned()),
            false,
            headers.get("content-type").map(String::as_str),
        );

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query,
            headers,
            params: HashMap::new(),
            body,
            claims: None,
            raw: Value::Null,
        }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.header("cookie")
            .and_then(|header| cookie::extract(header, name))
    }

    /// Decode the body into `T`.
    ///
    /// A missing body reads as `{}` and a string body is parsed as JSON, so
    /// clients that omit `content-type` still work.
    ///
    /// # Errors
    /// Returns an error if the body is not a JSON object or does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        let value = match &self.body {
            Value::Null => Ok(Value::Object(Map::new())),
            Value::String(raw) => serde_json::from_str(raw),
            other => Ok(other.clone()),
        }?;

        if !value.is_object() {
            return Err(RequestError::NotAnObject);
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Parse an inbound body. Never fails: anything that cannot be decoded or
/// parsed is kept as the raw string.
#[must_use]
pub fn parse_body(
    body: Option<String>,
    is_base64_encoded: bool,
    content_type: Option<&str>,
) -> Value {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Value::Null;
    };

    let raw = if is_base64_encoded {
        match Base64::decode_vec(body.trim()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!("Body flagged as base64 did not decode: {}", e);
                body
            }
        }
    } else {
        body
    };

    let is_json = content_type
        .is_some_and(|ct| ct.to_lowercase().contains("application/json"));

    if is_json {
        serde_json::from_str(&raw).unwrap_or(Value::String(raw))
    } else {
        Value::String(raw)
    }
}

/// Collapse a header map into one value per lowercase name. Repeated cookie
/// headers join with `; `, any other repeated header with `, `.
pub(crate) fn flatten_headers(map: &HeaderMap) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                let separator = if *name == COOKIE { "; " } else { ", " };
                existing.push_str(separator);
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}

fn lowercase_keys(headers: HashMap<String, String>) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect()
}
