#![allow(dead_code)]

use restgate::{
    api::{ApiConfig, App, CookieConfig, CorsPolicy, SameSite},
    idp::CognitoClient,
};
use serde_json::{json, Value};
use url::Url;
use wiremock::{
    matchers::{header, method},
    Mock, MockServer, ResponseTemplate,
};

pub const CLIENT_ID: &str = "test-client";

/// App wired to a mock user pool at `server`.
pub fn app(server: &MockServer, config: ApiConfig) -> App<CognitoClient> {
    let endpoint = Url::parse(&server.uri()).expect("mock server uri");
    let client = CognitoClient::new("eu-west-1", CLIENT_ID.to_string())
        .expect("client")
        .with_endpoint(endpoint);
    App::new(config, client)
}

pub fn secure_config() -> ApiConfig {
    ApiConfig::new()
        .with_cookie(
            CookieConfig::default()
                .with_secure(true)
                .with_same_site(SameSite::None),
        )
        .with_cors(CorsPolicy::Credentialed {
            origins: vec!["https://app.example".to_string()],
        })
}

/// Answer `action` with `status` and `body`.
pub async fn mock_action(server: &MockServer, action: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(header(
            "x-amz-target",
            format!("AWSCognitoIdentityProviderService.{action}").as_str(),
        ))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub fn tokens(access: &str, refresh: Option<&str>) -> Value {
    let mut result = json!({
        "AccessToken": access,
        "ExpiresIn": 3600,
        "IdToken": format!("id-{access}"),
        "TokenType": "Bearer"
    });
    if let Some(refresh) = refresh {
        result["RefreshToken"] = json!(refresh);
    }
    json!({ "AuthenticationResult": result })
}

/// Payload format 2.0 event.
pub fn http_api_event(method: &str, path: &str, body: Option<Value>) -> Value {
    let mut event = json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": path,
        "rawQueryString": "",
        "headers": { "content-type": "application/json" },
        "requestContext": {
            "http": { "method": method, "path": path }
        },
        "isBase64Encoded": false
    });
    if let Some(body) = body {
        event["body"] = json!(body.to_string());
    }
    event
}

/// Payload format 1.0 event.
pub fn rest_api_event(method: &str, path: &str, body: Option<Value>) -> Value {
    let mut event = json!({
        "resource": "/{proxy+}",
        "path": path,
        "httpMethod": method,
        "headers": { "Content-Type": "application/json" },
        "queryStringParameters": null,
        "requestContext": {},
        "isBase64Encoded": false
    });
    if let Some(body) = body {
        event["body"] = json!(body.to_string());
    }
    event
}

pub fn body_json(response: &Value) -> Value {
    response["body"]
        .as_str()
        .and_then(|body| serde_json::from_str(body).ok())
        .unwrap_or(Value::Null)
}
