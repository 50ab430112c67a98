use crate::{
    auth::{
        generate_secret, AdminIdentity, AuthConfig, AuthState, CredentialStore, SystemClock,
        DEFAULT_ADMIN_PASSWORD, MIN_SECRET_LEN,
    },
    cli::globals::GlobalArgs,
    dbviewer, storage,
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_ttl_seconds: i64,
    pub secure_cookie: bool,
    pub globals: GlobalArgs,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the admin credential or session secret is invalid, the database
/// cannot be opened, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let admin = admin_identity(&args.globals)?;
    let secret = session_secret(&args.globals)?;

    let auth_config = AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.secure_cookie);
    let auth_state = AuthState::new(
        auth_config,
        CredentialStore::new(admin),
        secret,
        Arc::new(SystemClock),
    )
    .context("Failed to initialize session signing")?;

    let pool = storage::connect(&args.dsn).await?;
    storage::init(&pool).await?;
    debug!("Database ready: {}", args.dsn);

    dbviewer::new(args.port, pool, Arc::new(auth_state)).await
}

/// Resolve the admin identity: a configured hash wins, then a plaintext password,
/// then the default credential.
fn admin_identity(globals: &GlobalArgs) -> Result<AdminIdentity> {
    let username = globals.admin_username.clone();
    match (&globals.admin_password_hash, &globals.admin_password) {
        (Some(hash), _) => AdminIdentity::new(username, hash.clone()),
        (None, Some(password)) => AdminIdentity::from_plaintext(username, password),
        (None, None) => {
            warn!(
                "No admin password configured, using the default password for '{}'. \
                 Set DBVIEWER_ADMIN_PASSWORD_HASH in production!",
                username
            );
            AdminIdentity::from_plaintext(
                username,
                &SecretString::from(DEFAULT_ADMIN_PASSWORD.to_string()),
            )
        }
    }
}

fn session_secret(globals: &GlobalArgs) -> Result<SecretSlice<u8>> {
    match &globals.session_secret {
        Some(secret) => {
            let bytes = secret.expose_secret().as_bytes().to_vec();
            if bytes.len() < MIN_SECRET_LEN {
                return Err(anyhow!(
                    "DBVIEWER_SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes"
                ));
            }
            Ok(SecretSlice::from(bytes))
        }
        None => {
            warn!(
                "DBVIEWER_SESSION_SECRET not set, using a random secret. \
                 Sessions will not survive a restart."
            );
            Ok(generate_secret())
        }
    }
}
