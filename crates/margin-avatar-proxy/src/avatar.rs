//! Avatar request parsing and resolution

use crate::error::{AvatarProxyError, Result};
use crate::fetcher::AvatarFetcher;
use crate::placeholder::placeholder_svg;
use crate::types::{AvatarResponse, AvatarSize, AVATAR_MAX_AGE, PLACEHOLDER_MAX_AGE};
use bsky_profile_client::ProfileClient;
use tracing::{debug, warn};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// A parsed `/<signature>/<actor>?size=` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRequest {
    pub signature: String,
    /// Percent-decoded actor identifier
    pub actor: String,
    pub size: AvatarSize,
}

impl AvatarRequest {
    /// Parse a request path and query string.
    ///
    /// Returns `Ok(None)` for the root path. Segments after the actor are
    /// ignored.
    pub fn parse(path: &str, query: Option<&str>) -> Result<Option<Self>> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let Some(signature) = segments.next() else {
            return Ok(None);
        };
        let Some(encoded_actor) = segments.next() else {
            return Err(AvatarProxyError::BadRequest(format!(
                "expected /<signature>/<actor>, got {}",
                path
            )));
        };

        let actor = urlencoding::decode(encoded_actor)
            .map_err(|e| AvatarProxyError::BadRequest(format!("actor is not UTF-8: {}", e)))?
            .into_owned();

        let size = query.and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "size")
                .map(|(_, value)| value.into_owned())
        });

        Ok(Some(Self {
            signature: signature.to_string(),
            actor,
            size: AvatarSize::from_query(size.as_deref()),
        }))
    }
}

/// Resolves an actor to an avatar image or placeholder
pub struct AvatarResolver {
    profiles: ProfileClient,
    fetcher: AvatarFetcher,
}

impl AvatarResolver {
    pub fn new(profiles: ProfileClient, fetcher: AvatarFetcher) -> Self {
        Self { profiles, fetcher }
    }

    /// Resolve the avatar for an already-authorized actor.
    ///
    /// A profile without an avatar yields a cacheable placeholder. A failed
    /// avatar fetch yields a placeholder with no freshness hint so the next
    /// request tries again. Profile lookup transport errors propagate.
    pub async fn resolve(&self, actor: &str, size: AvatarSize) -> Result<AvatarResponse> {
        let profile = self.profiles.get_profile(actor).await?;

        let Some(avatar_url) = profile.and_then(|p| p.avatar) else {
            debug!(actor, size = size.as_str(), "No avatar on profile");
            return Ok(placeholder(actor, size, true));
        };

        match self.fetcher.fetch(&avatar_url, size).await {
            Ok(avatar) => Ok(AvatarResponse::new(
                avatar.data,
                avatar.content_type,
                Some(AVATAR_MAX_AGE),
            )),
            Err(e) => {
                warn!(
                    actor,
                    avatar_url = %avatar_url,
                    error = %e,
                    "Avatar fetch failed, serving placeholder"
                );
                Ok(placeholder(actor, size, false))
            }
        }
    }
}

fn placeholder(actor: &str, size: AvatarSize, cacheable: bool) -> AvatarResponse {
    AvatarResponse::new(
        placeholder_svg(actor, size),
        SVG_CONTENT_TYPE,
        cacheable.then_some(PLACEHOLDER_MAX_AGE),
    )
}
