//! # Plinth (Web Application Starter)
//!
//! `plinth` is a database-backed web application starter: an axum HTTP API
//! with OpenAPI docs, users/settings/counters storage, and a credential and
//! session core (Argon2id password hashing, HS256 session tokens, and
//! provisioned secret material).
//!
//! ## Sessions
//!
//! Sessions are stateless bearer tokens. A login issues a signed JWT that is
//! returned in the response body and as an `app_user` cookie; either form is
//! accepted on later requests. There is no server-side session table, so
//! logout only clears the client cookie.
//!
//! ## Secret material
//!
//! The JWT signing key and the cookie encryption key are generated once by
//! `plinth provision` and stored in the settings table. The server refuses
//! to start when the signing key is missing: an unsigned deployment is a
//! worse failure than refusing to boot.

pub mod api;
pub mod auth;
pub mod cli;
pub mod secrets;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_commit_hash_is_hex_or_unknown() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
