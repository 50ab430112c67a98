use crate::auth::hash_password;
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

/// Print the PHC hash of `password` to stdout.
/// # Errors
/// Returns an error if hashing fails.
pub fn execute(password: &SecretString) -> Result<()> {
    let hash = hash_password(password.expose_secret())?;
    println!("{hash}");
    Ok(())
}
