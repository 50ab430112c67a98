//! # dbviewer
//!
//! A small record viewer backed by a local SQLite database. Anyone may browse
//! the records; creating, editing and deleting them is reserved for a single
//! administrator configured at startup.
//!
//! ## Sessions
//!
//! A successful login issues an HS256-signed token carried in an `HttpOnly`
//! cookie. Tokens are self-contained: nothing is stored server side, so
//! logging out only clears the cookie and an issued token stays valid until
//! it expires.

pub mod auth;
pub mod cli;
pub mod dbviewer;
pub mod storage;
pub mod views;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
