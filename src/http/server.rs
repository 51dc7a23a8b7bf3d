//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router for the proxied prefix
//! - Wire up middleware (tracing, CORS preflight)
//! - Bind server to listener, drain on shutdown
//! - Forward requests to the upstream and relay the answer

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::LOCATION, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::client::UpstreamClient;
use crate::http::cors;
use crate::http::request::{build_upstream_request, request_id, upstream_url};
use crate::http::response;
use crate::observability::metrics;
use crate::payload;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: UpstreamClient,
    /// Parsed `routing.allowed_methods`. Empty allows everything.
    pub allowed_methods: Arc<[Method]>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        let client = UpstreamClient::new(&config.upstream);
        // Validation has already rejected unparsable entries
        let allowed_methods = config
            .routing
            .allowed_methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
            .collect();

        Self {
            config: Arc::new(config),
            client,
            allowed_methods,
        }
    }

    fn method_allowed(&self, method: &Method) -> bool {
        self.allowed_methods.is_empty() || self.allowed_methods.contains(method)
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState::new(config);
        let config = state.config.clone();
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.routing.path_prefix.as_str();
        let wildcard = format!("{prefix}{{*path}}");

        let mut router = Router::new()
            .route(prefix, any(proxy_handler))
            .route(&wildcard, any(proxy_handler));

        // `/api` is redirected to `/api/`
        let bare = prefix.trim_end_matches('/');
        if !bare.is_empty() {
            let target = prefix.to_string();
            router = router.route(
                bare,
                any(move |uri: Uri| redirect_to_prefix(target.clone(), uri)),
            );
        }

        router
            .route_layer(middleware::from_fn(cors::preflight_middleware))
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// Run the server until `shutdown` fires, then drain open connections.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Forwards the request to the upstream and relays the response.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers());

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = match forward(&state, request, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = e.status_code().as_u16(),
                error = %e,
                "Request failed"
            );
            metrics::record_error(e.kind());
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn redirect_to_prefix(prefix: String, uri: Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{prefix}?{query}"),
        None => prefix,
    };
    let mut response = (StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response();
    cors::apply(response.headers_mut());
    response
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, ProxyError> {
    if !state.method_allowed(request.method()) {
        return Err(ProxyError::MethodNotAllowed(request.method().clone()));
    }

    let (parts, body) = request.into_parts();
    let limit = state.config.payload.max_body_bytes.unwrap_or(usize::MAX);
    let body = axum::body::to_bytes(body, limit)
        .await
        .map_err(ProxyError::ReadBody)?;

    let body = payload::prepare_body(&state.config.payload, body)?;

    let url = upstream_url(&state.config.upstream.url, &parts.uri);
    tracing::debug!(request_id = %request_id, upstream_url = %url, "Proxying request");

    let outbound = build_upstream_request(&parts, &url, body)?;
    let upstream = state.client.send(outbound).await?;

    tracing::debug!(
        request_id = %request_id,
        status = upstream.status().as_u16(),
        "Upstream responded"
    );

    Ok(response::relay(upstream))
}
