use serde::{Deserialize, Serialize};

/// Subset of `app.bsky.actor.defs#profileViewDetailed` the proxy cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}
