//! Bluesky Profile Client
//!
//! Looks up actor profiles through the public `app.bsky.actor.getProfile`
//! XRPC endpoint. Used by the avatar proxy to find an actor's avatar URL.

mod client;
mod error;
mod types;

pub use client::ProfileClient;
pub use error::{ProfileError, Result};
pub use types::Profile;
