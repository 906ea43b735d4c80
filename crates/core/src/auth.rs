//! Service token authentication.
//!
//! The hub runs with a single configured service token. Workers and HTTP
//! callers present it as a bearer token; comparison is constant time
//! (length-independent short-circuiting is disallowed by the socket
//! boundary contract).

use sha2::{Digest, Sha256};

use crate::error::{AuthErrorCode, Error, Result};

/// The configured service token, wrapped so the raw value never appears in
/// Debug output or logs.
#[derive(Clone)]
pub struct ServiceToken {
    digest: [u8; 32],
}

impl std::fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceToken").finish_non_exhaustive()
    }
}

impl ServiceToken {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        }
    }

    /// Constant-time equality check against a presented token.
    ///
    /// Both sides are reduced to SHA-256 digests first, so the comparison
    /// always runs over 32 bytes regardless of either token's length, and
    /// the full digest is folded before the verdict is produced.
    pub fn matches(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        let mut diff = 0u8;
        for (a, b) in self.digest.iter().zip(presented.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }

    /// Validate a presented token, returning a coded auth error on mismatch.
    pub fn verify(&self, presented: &str) -> Result<()> {
        if presented.is_empty() {
            return Err(Error::auth(
                AuthErrorCode::MissingToken,
                "Service token is required",
            ));
        }
        if !self.matches(presented) {
            return Err(Error::auth(AuthErrorCode::InvalidToken, "Invalid service token"));
        }
        Ok(())
    }
}

/// Extract a bearer token from request headers.
///
/// Checks in order:
/// 1. `Authorization: Bearer <token>`
/// 2. `X-Service-Token: <token>`
pub fn extract_bearer_token<'a>(
    auth_header: Option<&'a str>,
    token_header: Option<&'a str>,
) -> Result<&'a str> {
    if let Some(auth) = auth_header {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Ok(token.trim());
        }
    }

    if let Some(token) = token_header {
        return Ok(token.trim());
    }

    Err(Error::auth(
        AuthErrorCode::MissingToken,
        "Service token is required",
    ))
}
