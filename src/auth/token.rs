//! Session token issuance and validation.
//!
//! Tokens are compact HS256 JWTs signed with the single provisioned
//! deployment secret. Possession of a validly signed, unexpired token is
//! the sole authorization proof; nothing is persisted server-side.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::store::users::User;

/// Sessions expire 72 hours after issuance.
pub const SESSION_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// Identity claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &[u8], issuer: String) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer,
        }
    }

    /// Issue a signed session token for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] when the signer fails; callers must
    /// surface this as an internal failure, never as bad credentials.
    pub fn generate(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp: unix_now() + SESSION_TTL.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Validate a presented token and return its claims.
    ///
    /// A token without an `exp` claim is rejected, not silently accepted.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenExpired`] past the expiry instant,
    /// [`AuthError::TokenSignatureInvalid`] for a signature mismatch, and
    /// [`AuthError::TokenMalformed`] for anything that does not parse as a
    /// well-formed token with the required claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                _ => AuthError::TokenMalformed,
            })
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &[u8]) -> TokenService {
        TokenService::new(secret, "issuer.test".to_string())
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@localhost".to_string(),
            role: "admin".to_string(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn generated_token_validates_with_matching_claims() {
        let tokens = service(b"secret-key");
        let user = user();

        let token = tokens.generate(&user).expect("generate");
        let claims = tokens.validate(&token).expect("validate");

        assert_eq!(claims.iss, "issuer.test");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, user.role);
        assert!(claims.exp > unix_now());
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = service(b"key-one").generate(&user()).expect("generate");
        let err = service(b"key-two").validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenSignatureInvalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service(b"secret-key");
        let claims = Claims {
            iss: "issuer.test".to_string(),
            sub: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@localhost".to_string(),
            role: "admin".to_string(),
            exp: unix_now() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-key"),
        )
        .expect("encode");

        let err = tokens.validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn token_without_expiry_is_rejected() {
        #[derive(Serialize)]
        struct NoExpiry {
            iss: String,
            sub: Uuid,
        }

        let claims = NoExpiry {
            iss: "issuer.test".to_string(),
            sub: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-key"),
        )
        .expect("encode");

        let err = service(b"secret-key").validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = service(b"secret-key").validate("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));
    }
}
