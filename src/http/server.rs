//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the edge handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Invoke the tenant router exactly once per viewer request
//! - Forward rewritten requests to the shared origin
//! - Swap routing state atomically on config reload

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::forward::{into_viewer_response, ForwardError, Origin};
use crate::http::request::{MakeRequestUuidV4, RequestIdExt};
use crate::observability::metrics;
use crate::routing::router::request_host;
use crate::routing::{RoutingError, TenantRouter};

/// Routing state replaced as a unit on reload.
#[derive(Debug)]
pub struct InnerState {
    pub router: TenantRouter,
    pub origin: Origin,
}

impl InnerState {
    pub fn from_config(config: &RouterConfig) -> Result<Self, ForwardError> {
        Ok(Self {
            router: TenantRouter::from_config(&config.routing),
            origin: Origin::from_config(&config.origin)?,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
    pub client: Client<HttpConnector, Body>,
}

/// Edge host: the HTTP front door that applies the tenant router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    inner: Arc<ArcSwap<InnerState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig) -> Result<Self, ForwardError> {
        let inner = Arc::new(ArcSwap::from_pointee(InnerState::from_config(&config)?));
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            inner: inner.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            inner,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(edge_handler))
            .route("/{*path}", any(edge_handler))
            // Targets without a rooted path (CONNECT, `OPTIONS *`) match no route.
            .fallback(edge_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Validated configs arriving on `config_updates` replace the routing
    /// state; the server stops once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_domain = %self.config.routing.base_domain,
            origin = %self.inner.load().origin.authority(),
            "HTTP server starting"
        );

        let inner = self.inner.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match InnerState::from_config(&config) {
                    Ok(next) => {
                        tracing::info!(
                            base_domain = %next.router.base_domain(),
                            origin = %next.origin.authority(),
                            "Routing configuration reloaded"
                        );
                        inner.store(Arc::new(next));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded configuration, keeping current");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Host the viewer addressed, for logs. Falls back to the HTTP/2 authority.
fn viewer_host<B>(request: &Request<B>) -> String {
    match request_host(request) {
        Ok(host) => host.to_string(),
        Err(RoutingError::InvalidHost { host }) => host,
        Err(_) => String::new(),
    }
}

fn rejection_status(err: &RoutingError) -> StatusCode {
    if err.is_invariant_violation() {
        StatusCode::MISDIRECTED_REQUEST
    } else {
        StatusCode::BAD_REQUEST
    }
}

fn reject(err: &RoutingError, start: Instant) -> Response {
    let status = rejection_status(err);
    metrics::record_request("rejected", status.as_u16(), start);
    let body = if err.is_invariant_violation() {
        "Host is not served by this distribution"
    } else {
        "Request target has no path"
    };
    (status, body).into_response()
}

/// Route the viewer request to its tenant prefix and forward it.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let host = viewer_host(&request);
    let original = request.uri().to_string();

    let inner = state.inner.load_full();

    let routed = match inner.router.route(request) {
        Ok(routed) => routed,
        Err(err) if err.is_invariant_violation() => {
            tracing::error!(
                request_id = %request_id,
                host = %host,
                base_domain = %inner.router.base_domain(),
                reason = err.reason(),
                error = %err,
                "Routing invariant violated, refusing request"
            );
            metrics::record_violation(err.reason());
            return reject(&err, start);
        }
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                host = %host,
                reason = err.reason(),
                error = %err,
                "Unsupported request target, refusing request"
            );
            return reject(&err, start);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        host = %host,
        original = %original,
        rewritten = %routed.uri(),
        "Routed request"
    );

    let upstream = match inner.origin.prepare(routed) {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to address origin");
            metrics::record_request("origin_error", StatusCode::BAD_GATEWAY.as_u16(), start);
            return (StatusCode::BAD_GATEWAY, "Origin request failed").into_response();
        }
    };

    match state.client.request(upstream).await {
        Ok(response) => {
            metrics::record_request("forwarded", response.status().as_u16(), start);
            into_viewer_response(response)
        }
        Err(e) => {
            let e = ForwardError::from(e);
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request("origin_error", StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
        }
    }
}
