//! Argon2id password hashing with the `"<base64 salt>:<base64 key>"`
//! storage encoding.
//!
//! Each hash draws a fresh 16-byte salt, so two hashes of the same
//! plaintext never match. Verification re-derives the key with identical
//! parameters and compares in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use base64ct::{Base64Unpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;

const SALT_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;
const TIME_COST: u32 = 1;
const MEMORY_COST_KIB: u32 = 64 * 1024;
const LANES: u32 = 4;

/// Side channel for verification diagnostics. Callers collapse these with
/// "wrong password" in the response they return.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hash format")]
    Format,
    #[error("invalid base64 encoding")]
    Encoding,
    #[error("failed to generate salt")]
    Salt(#[source] rand::Error),
    #[error("key derivation failed")]
    Derive(#[source] argon2::Error),
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    salt_length: usize,
    time_cost: u32,
    memory_cost_kib: u32,
    lanes: u32,
    key_length: usize,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            salt_length: SALT_LENGTH,
            time_cost: TIME_COST,
            memory_cost_kib: MEMORY_COST_KIB,
            lanes: LANES,
            key_length: KEY_LENGTH,
        }
    }
}

impl PasswordHasher {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error when the random source or key derivation fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt = vec![0u8; self.salt_length];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(PasswordError::Salt)?;

        let key = self.derive(plaintext, &salt)?;

        Ok(format!(
            "{}:{}",
            Base64Unpadded::encode_string(&salt),
            Base64Unpadded::encode_string(&key)
        ))
    }

    /// Verify a plaintext password against a stored encoded hash.
    ///
    /// `Ok(false)` means wrong password. A malformed stored hash is
    /// reported on the error side for diagnostics, never as a panic.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Format`] unless the stored value has
    /// exactly two colon-delimited segments, [`PasswordError::Encoding`]
    /// when a segment is not valid base64.
    pub fn verify(&self, plaintext: &str, encoded: &str) -> Result<bool, PasswordError> {
        let mut parts = encoded.split(':');
        let (Some(encoded_salt), Some(encoded_key), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(PasswordError::Format);
        };

        let salt = Base64Unpadded::decode_vec(encoded_salt).map_err(|_| PasswordError::Encoding)?;
        let stored_key =
            Base64Unpadded::decode_vec(encoded_key).map_err(|_| PasswordError::Encoding)?;

        let derived = self.derive(plaintext, &salt)?;

        // Equal-time regardless of where the first mismatching byte occurs.
        Ok(derived.ct_eq(&stored_key).into())
    }

    fn derive(&self, plaintext: &str, salt: &[u8]) -> Result<Vec<u8>, PasswordError> {
        let params = Params::new(
            self.memory_cost_kib,
            self.time_cost,
            self.lanes,
            Some(self.key_length),
        )
        .map_err(PasswordError::Derive)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = vec![0u8; self.key_length];
        argon2
            .hash_password_into(plaintext.as_bytes(), salt, &mut key)
            .map_err(PasswordError::Derive)?;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hasher = PasswordHasher::default();
        let encoded = hasher.hash("hunter2").expect("hash");
        assert!(hasher.verify("hunter2", &encoded).expect("verify"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hasher = PasswordHasher::default();
        let encoded = hasher.hash("hunter2").expect("hash");
        assert!(!hasher.verify("hunter3", &encoded).expect("verify"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = PasswordHasher::default();
        let first = hasher.hash("hunter2").expect("hash");
        let second = hasher.hash("hunter2").expect("hash");
        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first).expect("verify"));
        assert!(hasher.verify("hunter2", &second).expect("verify"));
    }

    #[test]
    fn encoded_form_has_two_segments() {
        let hasher = PasswordHasher::default();
        let encoded = hasher.hash("hunter2").expect("hash");
        let segments: Vec<&str> = encoded.split(':').collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            Base64Unpadded::decode_vec(segments[0]).expect("salt").len(),
            SALT_LENGTH
        );
        assert_eq!(
            Base64Unpadded::decode_vec(segments[1]).expect("key").len(),
            KEY_LENGTH
        );
    }

    #[test]
    fn missing_delimiter_is_a_format_error() {
        let hasher = PasswordHasher::default();
        let err = hasher.verify("hunter2", "no-delimiter").unwrap_err();
        assert!(matches!(err, PasswordError::Format));
    }

    #[test]
    fn extra_segments_are_a_format_error() {
        let hasher = PasswordHasher::default();
        let err = hasher.verify("hunter2", "a:b:c").unwrap_err();
        assert!(matches!(err, PasswordError::Format));
    }

    #[test]
    fn invalid_base64_is_an_encoding_error() {
        let hasher = PasswordHasher::default();
        let err = hasher.verify("hunter2", "not:validbase64!!").unwrap_err();
        assert!(matches!(err, PasswordError::Encoding));
    }

    #[test]
    fn truncated_stored_key_does_not_verify() {
        let hasher = PasswordHasher::default();
        let encoded = hasher.hash("hunter2").expect("hash");
        let (salt, _key) = encoded.split_once(':').expect("two segments");
        let tampered = format!("{salt}:{}", Base64Unpadded::encode_string(b"short"));
        assert!(!hasher.verify("hunter2", &tampered).expect("verify"));
    }
}
