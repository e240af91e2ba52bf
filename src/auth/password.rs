//! Password hashing
//!
//! Argon2id with a random 16-byte salt per hash. Hashes are stored in PHC
//! string format, so verification reads the cost parameters back from the
//! stored hash rather than from the current configuration.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::SecurityConfig;

const SALT_BYTES: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(argon2::Error),
    #[error("failed to gather salt entropy: {0}")]
    Entropy(getrandom::Error),
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Cost-parameterized Argon2id hasher
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    pub fn new(config: &SecurityConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(PasswordError::Params)?;
        Ok(Self { params })
    }

    /// Hash `password` into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        getrandom::getrandom(&mut salt_bytes).map_err(PasswordError::Entropy)?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordError::Hash)?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let phc = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::Hash)?;
        Ok(phc.to_string())
    }

    /// Check `password` against a stored PHC hash. Malformed hashes never verify.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashing() -> PasswordHashing {
        PasswordHashing::new(&SecurityConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_round_trip() {
        let hashing = hashing();
        let hash = hashing.hash("pw1").unwrap();
        assert_ne!(hash, "pw1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify("pw1", &hash));
        assert!(!hashing.verify("pw2", &hash));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hashing = hashing();
        let first = hashing.hash("same password").unwrap();
        let second = hashing.hash("same password").unwrap();
        assert_ne!(first, second);
        assert!(hashing.verify("same password", &first));
        assert!(hashing.verify("same password", &second));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let hashing = hashing();
        assert!(!hashing.verify("pw1", "pw1"));
        assert!(!hashing.verify("", ""));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHashing::new(&SecurityConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::Params(_))));
    }
}
