//! Request dispatch shared by the Lambda runtime and the development server.

pub mod config;
pub mod cookie;
pub mod gateway;
pub mod handlers;
pub mod openapi;
pub mod request;
pub mod response;
pub mod router;

pub use config::{ApiConfig, CookieConfig, SameSite};
pub use gateway::{GatewayEvent, GatewayResponse, PayloadFormat};
pub use request::{Claims, Request, RequestError};
pub use response::{CorsPolicy, Response};

use crate::idp::IdentityProvider;
use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{self, header::ALLOW, HeaderName, HeaderValue, Method, StatusCode},
    Router,
};
use router::{Resolution, ROUTES};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, instrument, warn, Span};
use ulid::Ulid;

/// Largest request body the development server buffers. Matches the API
/// gateway payload limit.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// One deployment: its settings and the identity provider it forwards to.
#[derive(Debug)]
pub struct App<P> {
    config: ApiConfig,
    provider: P,
}

impl<P: IdentityProvider> App<P> {
    #[must_use]
    pub fn new(config: ApiConfig, provider: P) -> Self {
        Self { config, provider }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer one normalized request. Never fails: handler errors are logged
    /// and turned into a generic 500.
    #[instrument(skip_all, fields(http.method = %request.method, http.path = %request.path))]
    pub async fn handle(&self, request: Request) -> Response {
        let origin = request.header("origin").map(ToString::to_string);

        let mut response = if request.method == Method::OPTIONS {
            Response::empty(StatusCode::NO_CONTENT)
        } else {
            self.route(request).await
        };

        self.config.cors().apply(&mut response, origin.as_deref());

        info!(status = response.status.as_u16(), "request handled");

        response
    }

    async fn route(&self, mut request: Request) -> Response {
        match router::resolve(&ROUTES, &request.method, &request.path) {
            Resolution::NotFound => Response::json(
                StatusCode::NOT_FOUND,
                &json!({ "error": "Not Found", "path": request.path }),
            ),

            Resolution::MethodNotAllowed { allow } => {
                let allow = allow
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let response = Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
                match HeaderValue::from_str(&allow) {
                    Ok(value) => response.with_header(ALLOW, value),
                    Err(e) => {
                        error!("Failed to build Allow header: {}", e);
                        response
                    }
                }
            }

            Resolution::Matched { endpoint, params } => {
                request.params = params;
                match handlers::dispatch(self, endpoint, &request).await {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Handler error: {:#}", e);
                        Response::internal_error()
                    }
                }
            }
        }
    }

    /// Answer one raw gateway invocation with a response in the same payload
    /// format. Undecodable events get a 400 in format 1.0.
    pub async fn handle_event(&self, event: Value) -> GatewayResponse {
        let gateway = match GatewayEvent::from_value(&event) {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!("Rejected undecodable gateway event: {}", e);
                return GatewayResponse::encode(
                    PayloadFormat::V1,
                    self.rejected(Response::error(StatusCode::BAD_REQUEST, "Bad Request")),
                );
            }
        };

        let format = gateway.format();

        let response = match gateway.into_request(event) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected gateway event: {}", e);
                self.rejected(Response::error(StatusCode::BAD_REQUEST, "Invalid method"))
            }
        };

        GatewayResponse::encode(format, response)
    }

    fn rejected(&self, mut response: Response) -> Response {
        self.config.cors().apply(&mut response, None);
        response
    }
}

/// Development router: every path goes through [`App::handle`], so local
/// behavior matches the deployed function.
pub fn router<P: IdentityProvider + 'static>(app: Arc<App<P>>) -> Router {
    Router::new()
        .fallback(proxy::<P>)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
        .with_state(app)
}

/// Start the development server
/// # Errors
/// Return error if failed to bind or serve
pub async fn serve<P: IdentityProvider + 'static>(port: u16, app: Arc<App<P>>) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, router(app).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

async fn proxy<P: IdentityProvider + 'static>(
    State(app): State<Arc<App<P>>>,
    request: http::Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            let mut response = Response::error(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
            app.config().cors().apply(&mut response, None);
            return response;
        }
    };

    app.handle(Request::from_http(&parts, &bytes)).await
}

fn make_span(request: &http::Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.path = request.uri().path(),
        request_id
    )
}
