//! Auth configuration and the shared state handed to handlers.

use super::{
    clock::Clock,
    credentials::CredentialStore,
    token::{TokenCodec, TokenError},
};
use secrecy::SecretSlice;
use std::sync::Arc;

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

/// Immutable after startup; shared across requests behind an `Arc`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    credentials: CredentialStore,
    codec: TokenCodec,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the secret or the configured TTL is rejected by the token codec.
    pub fn new(
        config: AuthConfig,
        credentials: CredentialStore,
        secret: SecretSlice<u8>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        let codec = TokenCodec::new(secret, config.session_ttl_seconds(), clock)?;
        Ok(Self {
            config,
            credentials,
            codec,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
