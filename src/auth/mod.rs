//! Credential and session core.
//!
//! Argon2id password hashing with per-hash random salts, HS256 session
//! tokens carrying identity claims, and typed principal extraction from
//! incoming requests. Every operation here is pure given its inputs and the
//! signing key loaded at construction; nothing holds shared mutable state,
//! so the services are safe to call from any number of request tasks.

mod error;
mod flow;
mod identity;
mod password;
mod token;

pub use error::AuthError;
pub use flow::authenticate;
pub use identity::{identity, require_auth, AuthUser, SESSION_COOKIE_NAME};
pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenService, SESSION_TTL};
