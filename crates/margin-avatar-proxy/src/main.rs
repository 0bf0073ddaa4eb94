//! Margin Avatar Proxy - signed avatar resolution and caching
//!
//! Serves actor avatars behind HMAC-signed URLs minted by the Margin
//! backend, falling back to a deterministic SVG placeholder.

mod avatar;
mod cache;
mod config;
mod error;
mod fetcher;
mod placeholder;
mod server;
mod signature;
#[cfg(test)]
mod test_support;
mod types;

use crate::avatar::AvatarResolver;
use crate::cache::{EdgeCache, MemoryEdgeCache};
use crate::config::AvatarProxyConfig;
use crate::error::{AvatarProxyError, Result};
use crate::fetcher::AvatarFetcher;
use crate::server::{start_server, ServerState, SharedState};
use crate::signature::{signed_avatar_path, AvatarSigner};
use crate::types::AvatarSize;
use bsky_profile_client::ProfileClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("sign") {
        return sign_command(&args[1..]);
    }

    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("margin_avatar_proxy=info".parse()?);

    // Use JSON format for Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Margin Avatar Proxy...");

    let config = AvatarProxyConfig::from_env()?;
    info!("Port: {}", config.port);
    info!("Profile service: {}", config.profile_service_url);
    info!(
        "Image transform: {}",
        config.image_transform_url.as_deref().unwrap_or("disabled")
    );
    info!(
        "Max cache size: {} MB",
        config.max_cache_size / (1024 * 1024)
    );

    let signer = AvatarSigner::new(config.shared_secret.as_bytes())?;
    let profiles =
        ProfileClient::with_timeout(&config.profile_service_url, config.upstream_timeout)?;
    let fetcher = AvatarFetcher::new(config.image_transform_url, config.upstream_timeout)?;
    let cache: Arc<dyn EdgeCache> = Arc::new(MemoryEdgeCache::new(config.max_cache_size));

    let state: SharedState = Arc::new(ServerState::new(
        cache,
        signer,
        AvatarResolver::new(profiles, fetcher),
    ));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}

/// `margin-avatar-proxy sign <actor> [--tiny]` prints the signed path for an actor
fn sign_command(args: &[String]) -> Result<()> {
    let actor = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| AvatarProxyError::Config("usage: sign <actor> [--tiny]".to_string()))?;
    let size = if args.iter().any(|a| a == "--tiny") {
        AvatarSize::Tiny
    } else {
        AvatarSize::Full
    };

    let config = AvatarProxyConfig::from_env()?;
    let signer = AvatarSigner::new(config.shared_secret.as_bytes())?;
    println!("{}", signed_avatar_path(&signer, actor, size));
    Ok(())
}
