//! Admin authentication.
//!
//! Flow Overview:
//! 1) `CredentialStore::verify` checks a username/password against the single
//!    configured admin.
//! 2) `TokenCodec::issue` signs a short-lived session token for that admin.
//! 3) The token travels back in the `access_token` cookie; every privileged
//!    handler resolves it through `principal::require_admin`.

mod clock;
mod credentials;
mod principal;
mod session;
mod state;
mod token;

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use credentials::{hash_password, AdminIdentity, CredentialStore, DEFAULT_ADMIN_PASSWORD};
pub use principal::{require_admin, Principal};
pub use session::{
    authenticate, clear_session_cookie, extract_session_token, session_cookie, SESSION_COOKIE_NAME,
};
pub use state::{AuthConfig, AuthState, DEFAULT_SESSION_TTL_SECONDS};
pub use token::{
    generate_secret, SessionClaims, SessionToken, TokenCodec, TokenError, MIN_SECRET_LEN,
};
