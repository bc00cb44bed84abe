//! The local agent endpoint.
//!
//! A loopback-only HTTP service the browser driver polls for registered
//! products. The driver probes ports starting at the base port with
//! `ping`, obtains the auth cookie from `request_control`, then passes
//! the cookie as a query parameter on every data request and reads
//! product listings as size-prefixed line blocks.
//!
//! Only the connection handshake (`ping`, `request_control`) and the
//! registration surface (`status`, `search_products`, `search_results`)
//! are served here. Update actions are the updater's concern, not the
//! demo's.

use crate::tool::UpdaterTool;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chiffon_core::formats::encode_product_feed;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};
use uuid::Uuid;

/// First port the driver probes.
pub const AGENT_BASE_PORT: u16 = 17458;

/// Number of consecutive ports probed after the base port.
pub const AGENT_PORT_MAX_ITER: u16 = 20;

/// Agent state string for a ready registry. The driver compares the
/// trimmed status body against these exact uppercase literals.
pub const STATE_IDLE: &str = "IDLE";

/// Agent state string when the registry is not available.
pub const STATE_UNCONFIGURED: &str = "UNCONFIGURED";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from running the agent endpoint.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Every probed port was taken.
    #[error("no free agent port in the {AGENT_PORT_MAX_ITER} ports starting at {0}")]
    NoFreePort(u16),

    /// Listener or serve failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// =============================================================================
// SHARED STATE
// =============================================================================

/// Shared state behind the agent routes.
#[derive(Clone)]
pub struct AgentState {
    tool: Arc<Mutex<UpdaterTool>>,
    cookie: Arc<str>,
}

impl AgentState {
    /// Wrap an updater tool and auth cookie for serving.
    #[must_use]
    pub fn new(tool: UpdaterTool, cookie: String) -> Self {
        Self {
            tool: Arc::new(Mutex::new(tool)),
            cookie: Arc::from(cookie),
        }
    }

    /// Generate a fresh auth cookie.
    #[must_use]
    pub fn generate_cookie() -> String {
        Uuid::new_v4().to_string()
    }

    /// The auth cookie requests must present.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Check the `cookie` query parameter in constant time.
    fn authorize(&self, params: &BTreeMap<String, String>) -> Result<(), Response> {
        let presented = params.get("cookie").map(String::as_str).unwrap_or_default();
        let matches: bool = presented
            .as_bytes()
            .ct_eq(self.cookie.as_bytes())
            .into();
        if matches {
            Ok(())
        } else {
            Err((StatusCode::UNAUTHORIZED, "unauthorized").into_response())
        }
    }
}

// =============================================================================
// ROUTES
// =============================================================================

/// Build the agent router.
///
/// `ping` and `request_control` are unauthenticated: the driver probes
/// ports with `ping`, then obtains the auth cookie from
/// `request_control` before issuing any authenticated request.
///
/// CORS is permissive: the driver is a web page doing cross-origin
/// requests to loopback, and the cookie parameter is the actual gate.
pub fn router(state: AgentState) -> Router {
    Router::new()
        .route("/agent/ping", get(ping))
        .route("/agent/request_control", get(request_control))
        .route("/agent/status", get(status))
        .route("/agent/search_products", get(search_products))
        .route("/agent/search_results", get(search_results))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

async fn ping() -> Response {
    (StatusCode::OK, "pong").into_response()
}

async fn request_control(State(state): State<AgentState>) -> Response {
    debug!("control requested, issuing auth cookie");
    (StatusCode::OK, state.cookie.to_string()).into_response()
}

async fn status(
    State(state): State<AgentState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    if let Err(denied) = state.authorize(&params) {
        return denied;
    }
    let Ok(tool) = state.tool.lock() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "agent state poisoned").into_response();
    };
    let body = if tool.is_initialized() {
        STATE_IDLE
    } else {
        STATE_UNCONFIGURED
    };
    (StatusCode::OK, body).into_response()
}

async fn search_products(
    State(state): State<AgentState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    if let Err(denied) = state.authorize(&params) {
        return denied;
    }
    let Ok(tool) = state.tool.lock() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "agent state poisoned").into_response();
    };
    match tool.product_count() {
        Ok(count) => (StatusCode::OK, count.to_string()).into_response(),
        Err(_) => (StatusCode::CONFLICT, STATE_UNCONFIGURED).into_response(),
    }
}

async fn search_results(
    State(state): State<AgentState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    if let Err(denied) = state.authorize(&params) {
        return denied;
    }
    let Ok(tool) = state.tool.lock() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "agent state poisoned").into_response();
    };
    match tool.products() {
        Ok(products) => {
            let feed = encode_product_feed(products.iter());
            (StatusCode::OK, feed).into_response()
        }
        Err(_) => (StatusCode::CONFLICT, STATE_UNCONFIGURED).into_response(),
    }
}

// =============================================================================
// SERVING
// =============================================================================

/// Bind a loopback listener, probing the driver's port range.
pub async fn bind_agent_listener(base_port: u16) -> Result<TcpListener, AgentError> {
    for offset in 0..AGENT_PORT_MAX_ITER {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(listener) => {
                if offset > 0 {
                    debug!(port, "fell back to alternate agent port");
                }
                return Ok(listener);
            }
            Err(err) => {
                debug!(port, error = %err, "agent port unavailable");
            }
        }
    }
    Err(AgentError::NoFreePort(base_port))
}

/// Serve the agent endpoint until ctrl-c.
pub async fn serve(state: AgentState, base_port: u16) -> Result<(), AgentError> {
    let cookie = state.cookie.clone();
    let app = router(state);
    let listener = bind_agent_listener(base_port).await?;
    let addr = listener.local_addr()?;
    info!(%addr, cookie = %cookie, "agent endpoint listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    // Serve until interrupted; a failed signal hook degrades to serving
    // until the process is killed
    let _ = tokio::signal::ctrl_c().await;
}

// =============================================================================
// TESTS
// =============================================================================
