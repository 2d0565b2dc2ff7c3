//! HMAC Webhook Signature Verification
//!
//! Checks the `<algorithm>=<hexDigest>` signature header GitHub attaches to
//! every delivery against the raw request body.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use tracing::debug;

use crate::auth::{AuthError, AuthResult};

/// Header value assumed when a delivery carries no signature at all.
///
/// Names the default scheme with an empty digest, so it never matches.
pub const MISSING_SIGNATURE: &str = "sha256=";

/// HMAC digest algorithms accepted in the signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha256,
    Sha512,
}

impl SignatureAlgorithm {
    /// Parse the algorithm part of a signature header.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    fn compute(self, secret: &[u8], payload: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => compute_with::<Hmac<Sha256>>(secret, payload),
            Self::Sha512 => compute_with::<Hmac<Sha512>>(secret, payload),
        }
    }

    fn matches(self, secret: &[u8], payload: &[u8], digest: &[u8]) -> bool {
        match self {
            Self::Sha256 => verify_with::<Hmac<Sha256>>(secret, payload, digest),
            Self::Sha512 => verify_with::<Hmac<Sha512>>(secret, payload, digest),
        }
    }
}

fn compute_with<M: Mac + KeyInit>(secret: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

fn verify_with<M: Mac + KeyInit>(secret: &[u8], payload: &[u8], digest: &[u8]) -> bool {
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    // Constant-time comparison; also rejects digests of the wrong length.
    mac.verify_slice(digest).is_ok()
}

/// Sign a payload and return the full header value (`sha256=<hex>`).
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    sign_payload_with(SignatureAlgorithm::Sha256, secret, payload)
}

/// Sign a payload with an explicit algorithm and return the header value.
pub fn sign_payload_with(algorithm: SignatureAlgorithm, secret: &str, payload: &[u8]) -> String {
    format!(
        "{}={}",
        algorithm.as_str(),
        hex::encode(algorithm.compute(secret.as_bytes(), payload))
    )
}

/// Verify a signature header against the raw body.
///
/// A missing header is handled as [`MISSING_SIGNATURE`]. Any header that does
/// not parse, names an unsupported algorithm, carries a non-hex digest or
/// simply does not match yields [`AuthError::SignatureMismatch`].
pub fn verify(payload: &[u8], header: Option<&str>, secret: &str) -> AuthResult<()> {
    let header = header.unwrap_or(MISSING_SIGNATURE);

    let Some((method, their_digest)) = header.split_once('=') else {
        debug!("Signature header has no algorithm separator");
        return Err(AuthError::SignatureMismatch);
    };

    let Some(algorithm) = SignatureAlgorithm::parse_str(method.trim()) else {
        debug!(algorithm = %method, "Unsupported signature algorithm");
        return Err(AuthError::SignatureMismatch);
    };

    let Ok(their_digest) = hex::decode(their_digest.trim()) else {
        debug!("Signature digest is not valid hex");
        return Err(AuthError::SignatureMismatch);
    };

    if !algorithm.matches(secret.as_bytes(), payload, &their_digest) {
        return Err(AuthError::SignatureMismatch);
    }

    debug!(algorithm = algorithm.as_str(), "Webhook signature verified");
    Ok(())
}
