//! App Identity Assertions
//!
//! Mints the short-lived RS256 JWT that proves the App's identity to GitHub.
//! A fresh assertion is minted for every webhook delivery; only the key and
//! the issuer are held for the lifetime of the process.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::{AuthError, AuthResult};

/// Assertion lifetime in seconds (GitHub accepts at most 10 minutes).
pub const ASSERTION_LIFETIME_SECS: i64 = 600;

/// JWT claims of an App assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// App identifier.
    pub iss: String,
}

/// Signed App assertion, valid for [`ASSERTION_LIFETIME_SECS`].
pub struct AppAssertion {
    token: Zeroizing<String>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AppAssertion {
    /// Compact JWS, for use as a bearer credential.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the assertion is no longer accepted at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for AppAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAssertion")
            .field("token", &"[redacted]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The App's signing identity: issuer ID plus RSA private key.
///
/// Built once at startup; read-only afterwards and shared between requests.
pub struct AppIdentity {
    app_id: String,
    encoding_key: EncodingKey,
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

/// Normalize private key material into PEM bytes.
///
/// Accepts a PEM document, a PEM whose newlines were flattened to literal
/// `\n` sequences (common in `.env` files), or a base64-encoded PEM.
fn decode_pem_key(raw: &str) -> AuthResult<Zeroizing<Vec<u8>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Configuration("App private key is empty".to_string()));
    }

    if trimmed.contains("-----BEGIN") {
        return Ok(Zeroizing::new(trimmed.replace("\\n", "\n").into_bytes()));
    }

    STANDARD
        .decode(trimmed)
        .map(Zeroizing::new)
        .map_err(|_| AuthError::Configuration("App private key is neither PEM nor base64".to_string()))
}

impl AppIdentity {
    /// Load the App identity from its identifier and private key material.
    ///
    /// Fails with [`AuthError::Configuration`] when either is unusable; the
    /// server must not start in that case.
    pub fn from_pem(app_id: &str, private_key: &str) -> AuthResult<Self> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            return Err(AuthError::Configuration("App identifier is empty".to_string()));
        }

        let pem = decode_pem_key(private_key)?;
        let encoding_key = EncodingKey::from_rsa_pem(&pem)
            .map_err(|e| AuthError::Configuration(format!("Invalid RSA private key: {e}")))?;

        let identity = Self {
            app_id: app_id.to_string(),
            encoding_key,
        };

        // PEM framing alone does not prove the key can sign.
        identity.mint_now()?;

        Ok(identity)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Mint an assertion issued at `now`.
    ///
    /// Sub-second precision is dropped: `iat` and `exp` are whole seconds.
    pub fn mint(&self, now: DateTime<Utc>) -> AuthResult<AppAssertion> {
        let iat = now.timestamp();
        let exp = iat + ASSERTION_LIFETIME_SECS;
        let claims = Claims {
            iat,
            exp,
            iss: self.app_id.clone(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Configuration(format!("Failed to sign App assertion: {e}")))?;

        let issued_at = Utc.timestamp_opt(iat, 0).single().unwrap_or(now);
        Ok(AppAssertion {
            token: Zeroizing::new(token),
            issued_at,
            expires_at: issued_at + Duration::seconds(ASSERTION_LIFETIME_SECS),
        })
    }

    /// Mint an assertion using the current wall-clock time.
    pub fn mint_now(&self) -> AuthResult<AppAssertion> {
        self.mint(Utc::now())
    }
}
