//! Core types for the Margin avatar proxy

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Freshness hint for a resolved avatar
pub const AVATAR_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Freshness hint for a placeholder served because the profile has no avatar
pub const PLACEHOLDER_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Requested avatar variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarSize {
    #[default]
    Full,
    Tiny,
}

impl AvatarSize {
    /// Parse the `size` query parameter; anything but `tiny` means full size
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("tiny") => AvatarSize::Tiny,
            _ => AvatarSize::Full,
        }
    }

    /// Edge length of the placeholder square in pixels
    pub fn placeholder_dimension(self) -> u32 {
        match self {
            AvatarSize::Full => 128,
            AvatarSize::Tiny => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AvatarSize::Full => "full",
            AvatarSize::Tiny => "tiny",
        }
    }
}

/// A complete avatar response, as served and as stored in the edge cache
#[derive(Debug, Clone)]
pub struct AvatarResponse {
    pub body: Bytes,
    pub content_type: String,
    /// Freshness hint; `None` marks a response that must not be cached
    pub max_age: Option<Duration>,
}

impl AvatarResponse {
    pub fn new(
        body: impl Into<Bytes>,
        content_type: impl Into<String>,
        max_age: Option<Duration>,
    ) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
            max_age,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        self.max_age.is_some()
    }

    /// Value for the `Cache-Control` response header
    pub fn cache_control(&self) -> String {
        match self.max_age {
            Some(max_age) => format!("public, max-age={}", max_age.as_secs()),
            None => "no-store".to_string(),
        }
    }
}

/// Statistics about the edge cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}
