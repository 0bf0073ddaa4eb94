//! HTTP server for the avatar proxy
//!
//! Provides `/health`, `/` and the signed `/{signature}/{actor}` endpoint.

use crate::avatar::{AvatarRequest, AvatarResolver};
use crate::cache::EdgeCache;
use crate::error::AvatarProxyError;
use crate::signature::AvatarSigner;
use crate::types::{AvatarResponse, HealthResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const ROOT_TEXT: &str =
    "Margin avatar proxy. Request /<signature>/<actor> or /<signature>/<actor>?size=tiny";

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: Arc<dyn EdgeCache>,
    pub signer: AvatarSigner,
    pub resolver: AvatarResolver,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: Arc<dyn EdgeCache>, signer: AvatarSigner, resolver: AvatarResolver) -> Self {
        Self {
            cache,
            signer,
            resolver,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .fallback(get_avatar)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

async fn root() -> &'static str {
    ROOT_TEXT
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: state.cache.stats().await,
    })
}

/// Serve `/{signature}/{actor}` for any path not claimed by another route
async fn get_avatar(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let request = match AvatarRequest::parse(uri.path(), uri.query()) {
        Ok(Some(request)) => request,
        Ok(None) => return ROOT_TEXT.into_response(),
        Err(e) => {
            debug!(path = uri.path(), error = %e, "Rejecting malformed avatar URL");
            return e.into_response();
        }
    };

    let key = cache_key(&headers, &uri);
    if let Some(cached) = state.cache.get(&key).await {
        return avatar_response(cached, true);
    }

    if !state.signer.verify(&request.actor, &request.signature) {
        warn!(actor = %request.actor, "Invalid avatar signature");
        return AvatarProxyError::InvalidSignature.into_response();
    }

    match state.resolver.resolve(&request.actor, request.size).await {
        Ok(avatar) => {
            if avatar.is_cacheable() {
                state.cache.put(key, avatar.clone()).await;
            }
            avatar_response(avatar, false)
        }
        Err(e) => e.into_response(),
    }
}

/// Cache key: the full request URL as received
fn cache_key(headers: &HeaderMap, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("{}{}", host, path_and_query),
        None => path_and_query.to_string(),
    }
}

fn avatar_response(avatar: AvatarResponse, from_cache: bool) -> Response {
    let cache_header = if from_cache { "HIT" } else { "MISS" };
    let cache_control = avatar.cache_control();

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, avatar.content_type),
            (header::CACHE_CONTROL, cache_control),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (HeaderName::from_static("x-cache"), cache_header.to_string()),
        ],
        avatar.body,
    )
        .into_response()
}
