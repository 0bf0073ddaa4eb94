//! Avatar image fetching, with optional edge image resizing

use crate::error::{AvatarProxyError, Result};
use crate::types::AvatarSize;
use axum::body::Bytes;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Resize options understood by the edge image-transform endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransform {
    pub width: u32,
    pub height: u32,
    pub fit: &'static str,
    pub format: &'static str,
}

impl ImageTransform {
    /// 32x32 cropped WebP used for `size=tiny`
    pub fn tiny() -> Self {
        Self {
            width: 32,
            height: 32,
            fit: "cover",
            format: "webp",
        }
    }
}

impl fmt::Display for ImageTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width={},height={},fit={},format={}",
            self.width, self.height, self.fit, self.format
        )
    }
}

/// Avatar bytes and content type as served upstream
#[derive(Debug, Clone)]
pub struct FetchedAvatar {
    pub data: Bytes,
    pub content_type: String,
}

/// HTTP client for avatar images
pub struct AvatarFetcher {
    client: Client,
    /// Base of a `/cdn-cgi/image`-style resize endpoint, without trailing slash
    transform_url: Option<String>,
}

impl AvatarFetcher {
    pub fn new(transform_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            transform_url: transform_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    /// URL to request for an avatar at the given size
    pub fn transformed_url(&self, avatar_url: &str, size: AvatarSize) -> String {
        match (size, &self.transform_url) {
            (AvatarSize::Tiny, Some(base)) => {
                format!("{}/{}/{}", base, ImageTransform::tiny(), avatar_url)
            }
            (AvatarSize::Tiny, None) => {
                debug!(avatar_url, "No image transform configured, serving original");
                avatar_url.to_string()
            }
            (AvatarSize::Full, _) => avatar_url.to_string(),
        }
    }

    /// Fetch an avatar image
    pub async fn fetch(&self, avatar_url: &str, size: AvatarSize) -> Result<FetchedAvatar> {
        let url = self.transformed_url(avatar_url, size);
        debug!(url = %url, size = size.as_str(), "Fetching avatar");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Failed to fetch avatar");
            return Err(AvatarProxyError::Upstream(format!(
                "avatar host returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = response.bytes().await?;

        debug!(
            size = data.len(),
            content_type = %content_type,
            "Fetched avatar"
        );

        Ok(FetchedAvatar { data, content_type })
    }
}
