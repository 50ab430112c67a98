//! Map validated CLI matches to an action.

use crate::cli::{
    actions::{server::Args, Action},
    commands::CMD_HASH_PASSWORD,
    globals::GlobalArgs,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub_m) = matches.subcommand_matches(CMD_HASH_PASSWORD) {
        let password = sub_m
            .get_one::<String>("password")
            .cloned()
            .context("missing required argument: password")?;
        return Ok(Action::HashPassword {
            password: SecretString::from(password),
        });
    }

    let secret = |name: &str| {
        matches
            .get_one::<String>(name)
            .cloned()
            .map(SecretString::from)
    };

    let globals = GlobalArgs::new(
        matches
            .get_one::<String>("admin-username")
            .cloned()
            .context("missing required argument: --admin-username")?,
    )
    .with_admin_password_hash(matches.get_one::<String>("admin-password-hash").cloned())
    .with_admin_password(secret("admin-password"))
    .with_session_secret(secret("session-secret"));

    Ok(Action::Server(Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8000),
        dsn: matches
            .get_one::<String>("dsn")
            .cloned()
            .context("missing required argument: --dsn")?,
        session_ttl_seconds: matches
            .get_one::<i64>("session-ttl-seconds")
            .copied()
            .context("missing required argument: --session-ttl-seconds")?,
        secure_cookie: matches.get_flag("secure-cookie"),
        globals,
    }))
}
