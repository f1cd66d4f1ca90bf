use thiserror::Error;

/// Failure taxonomy for login and token validation.
///
/// `UserNotFound` and `InvalidCredentials` both answer 401 at the HTTP
/// boundary so responses never leak whether a username exists; the
/// distinction only reaches the server log. `Signing` is an internal
/// failure and must never be collapsed into the credential errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("malformed token")]
    TokenMalformed,
    #[error("invalid token signature")]
    TokenSignatureInvalid,
    #[error("token expired")]
    TokenExpired,
}
