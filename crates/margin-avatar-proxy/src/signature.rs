//! HMAC-SHA256 signatures over actor identifiers
//!
//! The backend mints avatar URLs of the form `/<hex sig>/<actor>`; only a
//! holder of the shared secret can produce a signature that verifies here.

use crate::error::{AvatarProxyError, Result};
use crate::types::AvatarSize;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies actor identifiers with the shared secret
#[derive(Clone)]
pub struct AvatarSigner {
    mac: HmacSha256,
}

impl AvatarSigner {
    pub fn new(secret: &[u8]) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AvatarProxyError::Config(format!("invalid HMAC key: {}", e)))?;
        Ok(Self { mac })
    }

    /// Hex-encoded signature for an actor identifier
    pub fn sign(&self, actor: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(actor.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a hex signature against an actor identifier in constant time.
    /// Malformed hex never verifies.
    pub fn verify(&self, actor: &str, signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };

        let mut mac = self.mac.clone();
        mac.update(actor.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for AvatarSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSigner").finish_non_exhaustive()
    }
}

/// Build the signed request path the backend hands out for an actor
pub fn signed_avatar_path(signer: &AvatarSigner, actor: &str, size: AvatarSize) -> String {
    let mut path = format!("/{}/{}", signer.sign(actor), urlencoding::encode(actor));
    if size == AvatarSize::Tiny {
        path.push_str("?size=tiny");
    }
    path
}
