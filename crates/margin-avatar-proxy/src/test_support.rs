//! Local stand-ins for the profile API and avatar hosts

use crate::avatar::AvatarResolver;
use crate::fetcher::AvatarFetcher;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use bsky_profile_client::ProfileClient;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const JPEG_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];
pub const WEBP_BYTES: &[u8] = b"RIFF\0\0\0\0WEBP";

#[derive(Clone)]
pub struct FakeUpstream {
    pub base_url: String,
    pub profile_hits: Arc<AtomicUsize>,
    pub avatar_hits: Arc<AtomicUsize>,
    pub missing_hits: Arc<AtomicUsize>,
    pub transform_hits: Arc<AtomicUsize>,
    /// Avatar URL on a port nothing listens on
    pub unreachable_avatar_url: String,
}

async fn get_profile(
    State(upstream): State<FakeUpstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    upstream.profile_hits.fetch_add(1, Ordering::SeqCst);
    let base = &upstream.base_url;
    match params.get("actor").map(String::as_str) {
        Some("did:plc:withavatar") => Json(json!({
            "did": "did:plc:withavatar",
            "handle": "with.test",
            "avatar": format!("{base}/img/ok.jpg")
        }))
        .into_response(),
        Some("did:plc:brokenavatar") => Json(json!({
            "did": "did:plc:brokenavatar",
            "handle": "broken.test",
            "avatar": format!("{base}/img/missing.jpg")
        }))
        .into_response(),
        Some("did:plc:unreachableavatar") => Json(json!({
            "did": "did:plc:unreachableavatar",
            "handle": "offline.test",
            "avatar": upstream.unreachable_avatar_url
        }))
        .into_response(),
        Some("did:plc:noavatar") => Json(json!({
            "did": "did:plc:noavatar",
            "handle": "plain.test"
        }))
        .into_response(),
        Some("did:plc:garbled") => {
            ([(header::CONTENT_TYPE, "application/json")], "{\"did\":").into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "InvalidRequest", "message": "Profile not found" })),
        )
            .into_response(),
    }
}

async fn avatar(State(upstream): State<FakeUpstream>) -> Response {
    upstream.avatar_hits.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/jpeg")], JPEG_BYTES).into_response()
}

async fn missing(State(upstream): State<FakeUpstream>) -> Response {
    upstream.missing_hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND.into_response()
}

async fn transform(State(upstream): State<FakeUpstream>) -> Response {
    upstream.transform_hits.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/webp")], WEBP_BYTES).into_response()
}

/// Serve a fake profile API, avatar host and image-transform endpoint
pub async fn spawn_upstream() -> FakeUpstream {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let upstream = FakeUpstream {
        base_url: format!("http://{addr}"),
        profile_hits: Arc::new(AtomicUsize::new(0)),
        avatar_hits: Arc::new(AtomicUsize::new(0)),
        missing_hits: Arc::new(AtomicUsize::new(0)),
        transform_hits: Arc::new(AtomicUsize::new(0)),
        unreachable_avatar_url: format!("http://{closed_addr}/img/avatar.jpg"),
    };

    let app = Router::new()
        .route("/xrpc/app.bsky.actor.getProfile", get(get_profile))
        .route("/img/ok.jpg", get(avatar))
        .route("/img/missing.jpg", get(missing))
        .route("/cdn-cgi/image/{*rest}", get(transform))
        .with_state(upstream.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

pub fn test_resolver(upstream: &FakeUpstream) -> AvatarResolver {
    let profiles = ProfileClient::with_service_url(&upstream.base_url).unwrap();
    let fetcher = AvatarFetcher::new(
        Some(format!("{}/cdn-cgi/image", upstream.base_url)),
        Duration::from_secs(5),
    )
    .unwrap();
    AvatarResolver::new(profiles, fetcher)
}
