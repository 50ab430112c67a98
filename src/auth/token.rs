//! Token Codec: HS256 signed session tokens.
//!
//! Tokens use the compact JWS layout `header.claims.signature`, each segment
//! base64url without padding. Validity is self-contained: a token is honored
//! iff its HMAC verifies against the shared secret and `now < exp`.

use super::clock::Clock;
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretSlice};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{fmt, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const ALG_HS256: &str = "HS256";

/// Minimum length of the shared signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by a session token. Times are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Issuance id. Nothing consults it yet; it keys a future revocation set.
    pub jti: String,
}

/// A freshly issued token together with its claims.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("missing subject")]
    MissingSubject,
    #[error("session secret must be at least 32 bytes")]
    WeakSecret,
    #[error("session ttl must be positive")]
    InvalidTtl,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Generate a random signing secret of [`MIN_SECRET_LEN`] bytes.
#[must_use]
pub fn generate_secret() -> SecretSlice<u8> {
    let mut bytes = vec![0u8; MIN_SECRET_LEN];
    OsRng.fill_bytes(&mut bytes);
    SecretSlice::from(bytes)
}

pub struct TokenCodec {
    secret: SecretSlice<u8>,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_LEN`] or the TTL is not
    /// positive.
    pub fn new(
        secret: SecretSlice<u8>,
        ttl_seconds: i64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidTtl);
        }
        Ok(Self {
            secret,
            ttl_seconds,
            clock,
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    ///
    /// # Errors
    /// Returns an error if the subject is empty or encoding fails.
    pub fn issue(&self, subject: &str) -> Result<SessionToken, TokenError> {
        self.issue_at(subject, self.clock.now_unix())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error if the subject is empty or encoding fails.
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<SessionToken, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
            jti: Uuid::new_v4().to_string(),
        };
        let token = self.encode(&claims)?;
        Ok(SessionToken { token, claims })
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// Returns the first check that failed; callers treat any error as unauthenticated.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, self.clock.now_unix())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns the first check that failed; callers treat any error as unauthenticated.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::TokenFormat);
        };

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG_HS256 {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| TokenError::Base64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret()).map_err(|_| TokenError::WeakSecret)
    }
}
