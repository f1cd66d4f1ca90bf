//! Login orchestration: verify a looked-up credential record and issue a
//! session token.

use tracing::{error, info};

use super::error::AuthError;
use super::password::PasswordHasher;
use super::token::TokenService;
use crate::store::users::User;

/// Authenticate a login attempt against the stored credential record.
///
/// The caller passes the user-lookup result as-is; a miss and a wrong
/// password are logged distinctly here but the HTTP boundary answers both
/// with the same unauthorized response.
///
/// # Errors
///
/// [`AuthError::UserNotFound`] for a lookup miss,
/// [`AuthError::InvalidCredentials`] for a wrong password or an
/// unverifiable stored hash, [`AuthError::Signing`] when token issuance
/// fails (an internal error, never masked as bad credentials).
pub fn authenticate(
    user: Option<&User>,
    password: &str,
    hasher: &PasswordHasher,
    tokens: &TokenService,
) -> Result<String, AuthError> {
    let Some(user) = user else {
        return Err(AuthError::UserNotFound);
    };

    let valid = match hasher.verify(password, &user.password_hash) {
        Ok(valid) => valid,
        Err(err) => {
            // Malformed stored hash: collapse with "wrong password" for the
            // caller, keep the detail in the log.
            error!(username = %user.username, error = %err, "stored password hash failed verification");
            false
        }
    };

    if !valid {
        info!(username = %user.username, "invalid login credentials");
        return Err(AuthError::InvalidCredentials);
    }

    tokens.generate(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fixtures() -> (PasswordHasher, TokenService) {
        (
            PasswordHasher::default(),
            TokenService::new(b"secret-key", "issuer.test".to_string()),
        )
    }

    fn admin(hasher: &PasswordHasher) -> User {
        User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@localhost".to_string(),
            role: "admin".to_string(),
            password_hash: hasher.hash("admin").expect("hash"),
        }
    }

    #[test]
    fn valid_credentials_issue_a_token() {
        let (hasher, tokens) = fixtures();
        let user = admin(&hasher);

        let token = authenticate(Some(&user), "admin", &hasher, &tokens).expect("token");
        assert!(!token.is_empty());

        let claims = tokens.validate(&token).expect("claims");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let (hasher, tokens) = fixtures();
        let user = admin(&hasher);

        let err = authenticate(Some(&user), "wrong", &hasher, &tokens).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let (hasher, tokens) = fixtures();
        let err = authenticate(None, "admin", &hasher, &tokens).unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[test]
    fn malformed_stored_hash_is_invalid_credentials() {
        let (hasher, tokens) = fixtures();
        let mut user = admin(&hasher);
        user.password_hash = "not:validbase64!!".to_string();

        let err = authenticate(Some(&user), "admin", &hasher, &tokens).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
