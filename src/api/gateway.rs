//! API gateway proxy events in and proxy responses out.
//!
//! Both payload formats are accepted. The format is decided once when the
//! event is decoded and the rest of the crate only sees [`Request`].

use super::{
    request::{flatten_headers, Claims, EventParts, Request, RequestError},
    response::Response,
};
use aws_lambda_events::{
    apigw::{
        ApiGatewayProxyRequest, ApiGatewayProxyResponse, ApiGatewayV2httpRequest,
        ApiGatewayV2httpResponse,
    },
    encodings::Body,
    query_map::QueryMap,
};
use axum::http::{header::SET_COOKIE, HeaderMap};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Payload format of the event that produced a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadFormat {
    /// REST API proxy integration (format 1.0).
    V1,
    /// HTTP API proxy integration (format 2.0).
    V2,
}

#[derive(Debug, Clone)]
enum Payload {
    HttpApi(Box<ApiGatewayV2httpRequest>),
    RestApi(Box<ApiGatewayProxyRequest>),
}

/// A decoded proxy event.
///
/// The method and the authorizer claims are read from the event as sent: the
/// method may be absent or malformed, and claim values are arbitrary JSON.
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    payload: Payload,
    method: Option<String>,
    claims: Option<Claims>,
}

impl GatewayEvent {
    /// Decode a raw invocation payload. Events carrying `rawPath` are format
    /// 2.0, any other JSON object is format 1.0.
    ///
    /// # Errors
    /// Returns an error if the payload is not a JSON object or a field has the
    /// wrong type.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let Some(object) = value.as_object() else {
            return Err(serde::de::Error::custom("gateway event must be a JSON object"));
        };

        let format = if object.contains_key("rawPath") {
            PayloadFormat::V2
        } else {
            PayloadFormat::V1
        };

        let method_pointer = match format {
            PayloadFormat::V2 => "/requestContext/http/method",
            PayloadFormat::V1 => "/httpMethod",
        };
        let method = value
            .pointer(method_pointer)
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let claims = value
            .pointer("/requestContext/authorizer/claims")
            .and_then(Value::as_object)
            .or_else(|| {
                value
                    .pointer("/requestContext/authorizer/jwt/claims")
                    .and_then(Value::as_object)
            })
            .cloned();

        let shaped = Value::Object(shape(object, format));
        let payload = match format {
            PayloadFormat::V2 => Payload::HttpApi(Box::new(serde_json::from_value(shaped)?)),
            PayloadFormat::V1 => Payload::RestApi(Box::new(serde_json::from_value(shaped)?)),
        };

        Ok(Self {
            payload,
            method,
            claims,
        })
    }

    #[must_use]
    pub fn format(&self) -> PayloadFormat {
        match self.payload {
            Payload::HttpApi(_) => PayloadFormat::V2,
            Payload::RestApi(_) => PayloadFormat::V1,
        }
    }

    /// Normalize into a [`Request`]. `raw` is kept on the request untouched.
    ///
    /// # Errors
    /// Returns an error if the method is not a valid HTTP token.
    pub fn into_request(self, raw: Value) -> Result<Request, RequestError> {
        let parts = match self.payload {
            Payload::HttpApi(event) => EventParts {
                method: self.method,
                path: event.raw_path.filter(|p| !p.is_empty()),
                query: Some(flatten_query(&event.query_string_parameters)),
                headers: Some(flatten_headers(&event.headers)),
                cookies: event.cookies,
                body: event.body,
                is_base64_encoded: event.is_base64_encoded,
                claims: self.claims,
            },
            Payload::RestApi(event) => EventParts {
                method: self.method,
                path: event.path,
                query: Some(flatten_query(&event.query_string_parameters)),
                headers: Some(flatten_headers(&event.headers)),
                cookies: None,
                body: event.body,
                is_base64_encoded: event.is_base64_encoded,
                claims: self.claims,
            },
        };

        Request::from_event_parts(parts, raw)
    }
}

// Drops null members and replaces the parts taken from the raw event (method,
// request context) with the minimum the typed events require. Gateways send
// `null` for empty maps and flags, and authorizer claims are not strings only.
fn shape(object: &Map<String, Value>, format: PayloadFormat) -> Map<String, Value> {
    let mut shaped: Map<String, Value> = object
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    match format {
        PayloadFormat::V2 => {
            shaped.insert(
                "requestContext".to_string(),
                json!({ "http": { "method": "GET" }, "timeEpoch": 0 }),
            );
        }
        PayloadFormat::V1 => {
            shaped.insert("httpMethod".to_string(), json!("GET"));
            shaped.insert("requestContext".to_string(), json!({ "httpMethod": "GET" }));
        }
    }

    shaped
}

// Format 2.0 splits comma-separated values; join them back into one entry.
fn flatten_query(query: &QueryMap) -> HashMap<String, String> {
    let mut flat: HashMap<String, String> = HashMap::new();
    for (name, value) in query.iter() {
        flat.entry(name.to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    flat
}

/// Proxy integration response in the payload format of its event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    RestApi(ApiGatewayProxyResponse),
    HttpApi(ApiGatewayV2httpResponse),
}

impl GatewayResponse {
    /// Shape `response` for the payload format of the originating event.
    ///
    /// Format 2.0 carries `Set-Cookie` values in `cookies`. Format 1.0 keeps
    /// the last value of each header in `headers` and lists every value of
    /// repeated headers in `multiValueHeaders`.
    #[must_use]
    pub fn encode(format: PayloadFormat, response: Response) -> Self {
        let status_code = i64::from(response.status.as_u16());
        let body = Some(Body::Text(response.body));

        match format {
            PayloadFormat::V2 => {
                let mut headers = response.headers;
                let cookies = headers
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .map(ToString::to_string)
                    .collect();
                headers.remove(SET_COOKIE);

                Self::HttpApi(ApiGatewayV2httpResponse {
                    status_code,
                    headers,
                    body,
                    cookies,
                    ..ApiGatewayV2httpResponse::default()
                })
            }
            PayloadFormat::V1 => {
                let mut headers = HeaderMap::new();
                let mut multi_value_headers = HeaderMap::new();

                for name in response.headers.keys() {
                    let values = response.headers.get_all(name);
                    if values.iter().count() > 1 {
                        for value in values.iter() {
                            multi_value_headers.append(name.clone(), value.clone());
                        }
                    }
                    if let Some(last) = values.iter().last() {
                        headers.insert(name.clone(), last.clone());
                    }
                }

                Self::RestApi(ApiGatewayProxyResponse {
                    status_code,
                    headers,
                    multi_value_headers,
                    body,
                    ..ApiGatewayProxyResponse::default()
                })
            }
        }
    }

    #[must_use]
    pub fn status_code(&self) -> i64 {
        match self {
            Self::RestApi(response) => response.status_code,
            Self::HttpApi(response) => response.status_code,
        }
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        match self {
            Self::RestApi(response) => &response.headers,
            Self::HttpApi(response) => &response.headers,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        let body = match self {
            Self::RestApi(response) => response.body.as_ref(),
            Self::HttpApi(response) => response.body.as_ref(),
        };
        match body {
            Some(Body::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
