//! Service configuration from environment variables

use crate::error::{AvatarProxyError, Result};
use std::time::Duration;

const DEFAULT_PORT: u16 = 3002;
const DEFAULT_PROFILE_SERVICE_URL: &str = "https://public.api.bsky.app";
const DEFAULT_MAX_CACHE_SIZE: u64 = 64 * 1024 * 1024; // 64MB
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Configuration for the avatar proxy
#[derive(Clone)]
pub struct AvatarProxyConfig {
    pub port: u16,
    pub shared_secret: String,
    pub profile_service_url: String,
    pub image_transform_url: Option<String>,
    pub max_cache_size: u64,
    pub upstream_timeout: Duration,
}

impl AvatarProxyConfig {
    /// Parse configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let shared_secret = lookup("AVATAR_SHARED_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AvatarProxyError::Config("AVATAR_SHARED_SECRET must be set".to_string())
            })?;

        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let profile_service_url = lookup("PROFILE_SERVICE_URL")
            .unwrap_or_else(|| DEFAULT_PROFILE_SERVICE_URL.to_string());

        let image_transform_url = lookup("IMAGE_TRANSFORM_URL").filter(|s| !s.is_empty());

        let max_cache_size = lookup("MAX_CACHE_SIZE")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_CACHE_SIZE);

        let upstream_timeout = lookup("UPSTREAM_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS));

        Ok(Self {
            port,
            shared_secret,
            profile_service_url,
            image_transform_url,
            max_cache_size,
            upstream_timeout,
        })
    }
}

impl std::fmt::Debug for AvatarProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarProxyConfig")
            .field("port", &self.port)
            .field("shared_secret", &"<redacted>")
            .field("profile_service_url", &self.profile_service_url)
            .field("image_transform_url", &self.image_transform_url)
            .field("max_cache_size", &self.max_cache_size)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}
