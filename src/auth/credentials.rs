//! Credential Store holding the single admin identity.
//!
//! The identity is built once at startup from configuration and never
//! changes afterwards. Passwords are stored as Argon2id PHC strings.

use anyhow::{anyhow, Context, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tokio::task::JoinError;
use tracing::{debug, error, instrument};

/// Password seeded for the admin when no credential is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// The configured administrator: a username and an Argon2 password hash.
#[derive(Clone)]
pub struct AdminIdentity {
    username: String,
    password_hash: String,
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AdminIdentity {
    /// Build an identity from a username and a PHC-formatted password hash.
    ///
    /// # Errors
    /// Returns an error if the username is empty or the hash cannot be parsed.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(anyhow!("admin username must not be empty"));
        }

        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|err| anyhow!("invalid admin password hash: {err}"))?;

        Ok(Self {
            username,
            password_hash,
        })
    }

    /// Build an identity by hashing a plaintext password.
    ///
    /// # Errors
    /// Returns an error if the password is empty or hashing fails.
    pub fn from_plaintext(username: impl Into<String>, password: &SecretString) -> Result<Self> {
        let hash = hash_password(password.expose_secret()).context("hash admin password")?;
        Self::new(username, hash)
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Hash a password with Argon2id and a random salt, returning a PHC string.
///
/// # Errors
/// Returns an error if the password is empty or hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(anyhow!("password must not be empty"));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string();
    Ok(hash)
}

#[derive(Clone, Debug)]
pub struct CredentialStore {
    admin: AdminIdentity,
}

impl CredentialStore {
    #[must_use]
    pub fn new(admin: AdminIdentity) -> Self {
        Self { admin }
    }

    #[must_use]
    pub fn admin(&self) -> &AdminIdentity {
        &self.admin
    }

    /// Check a username/password pair against the configured admin.
    ///
    /// Mismatches return `false`; nothing here fails loudly.
    #[instrument(skip(self, password))]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(&self.admin.password_hash) else {
            return false;
        };

        // The hash runs even for an unknown username so both failures cost the same.
        let password_ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        let username_ok = username == self.admin.username;

        if !(username_ok && password_ok) {
            debug!("admin credential check failed");
        }

        username_ok && password_ok
    }

    /// Run [`CredentialStore::verify`] on the blocking pool.
    pub async fn verify_blocking(&self, username: String, password: SecretString) -> bool {
        let store = self.clone();
        let check = move || store.verify(&username, password.expose_secret());
        settle(tokio::task::spawn_blocking(check).await)
    }
}

/// A credential check that never completed counts as a failed login.
fn settle(outcome: Result<bool, JoinError>) -> bool {
    match outcome {
        Ok(valid) => valid,
        Err(err) => {
            error!("Credential check task failed: {err}");
            false
        }
    }
}
