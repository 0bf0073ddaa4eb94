use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::ProfileError;
use crate::types::Profile;

const DEFAULT_SERVICE_URL: &str = "https://public.api.bsky.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches actor profiles from a Bluesky AppView
pub struct ProfileClient {
    client: Client,
    service_url: String,
}

impl ProfileClient {
    /// Create a client against the public Bluesky API
    pub fn new() -> crate::Result<Self> {
        Self::with_service_url(DEFAULT_SERVICE_URL)
    }

    /// Create a client against a custom AppView URL
    pub fn with_service_url(service_url: &str) -> crate::Result<Self> {
        Self::with_timeout(service_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom AppView URL and per-request timeout
    pub fn with_timeout(service_url: &str, timeout: Duration) -> crate::Result<Self> {
        url::Url::parse(service_url)
            .map_err(|e| ProfileError::InvalidServiceUrl(format!("{service_url}: {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up an actor's profile by DID or handle.
    ///
    /// A non-success status from the AppView (unknown actor, takedown) is
    /// reported as `Ok(None)`; transport and decoding failures are errors.
    pub async fn get_profile(&self, actor: &str) -> crate::Result<Option<Profile>> {
        let url = format!(
            "{}/xrpc/app.bsky.actor.getProfile?actor={}",
            self.service_url,
            urlencoding::encode(actor)
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            debug!(actor, status = %response.status(), "Profile lookup returned no profile");
            return Ok(None);
        }

        let profile: Profile = response.json().await?;
        debug!(
            actor,
            did = %profile.did,
            has_avatar = profile.avatar.is_some(),
            "Fetched profile"
        );

        Ok(Some(profile))
    }
}
