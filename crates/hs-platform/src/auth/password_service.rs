//! Password Hashing Service
//!
//! Argon2id hashing with per-hash random salts. Plaintext passwords never
//! reach the database; only the PHC-format hash is stored.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use tracing::warn;

use crate::shared::error::{HomesteadError, Result};

/// Accepted password length bounds.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> std::result::Result<(), String> {
        if password.len() < self.min_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if password.len() > self.max_length {
            return Err(format!(
                "Password must be at most {} characters",
                self.max_length
            ));
        }
        Ok(())
    }
}

/// Argon2id cost configuration.
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Iterations.
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Config {
    /// Low-memory config for tests.
    pub fn testing() -> Self {
        Self {
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn to_params(&self) -> Params {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .expect("Invalid Argon2 params")
    }
}

pub struct PasswordService {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordService {
    pub fn new(config: Argon2Config, policy: PasswordPolicy) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, config.to_params());
        Self { argon2, policy }
    }

    /// Hash a password after checking it against the policy.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.policy
            .validate(password)
            .map_err(HomesteadError::validation)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HomesteadError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| HomesteadError::internal(format!("Invalid password hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                warn!("password verification failed");
                Ok(false)
            }
            Err(e) => Err(HomesteadError::internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(Argon2Config::default(), PasswordPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> PasswordService {
        PasswordService::new(Argon2Config::testing(), PasswordPolicy::default())
    }

    #[test]
    fn test_hash_and_verify() {
        let service = test_service();

        let hash = service.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "correct horse");

        assert!(service.verify_password("correct horse", &hash).unwrap());
        assert!(!service.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hash_uniqueness() {
        let service = test_service();

        let hash1 = service.hash_password("samepassword").unwrap();
        let hash2 = service.hash_password("samepassword").unwrap();

        // Random salts: same password, different hashes, both verify.
        assert_ne!(hash1, hash2);
        assert!(service.verify_password("samepassword", &hash1).unwrap());
        assert!(service.verify_password("samepassword", &hash2).unwrap());
    }

    #[test]
    fn test_policy_rejects_short_password() {
        let service = test_service();
        assert!(matches!(
            service.hash_password("short"),
            Err(HomesteadError::Validation { .. })
        ));
    }

    #[test]
    fn test_policy_rejects_oversized_password() {
        let service = test_service();
        let long = "x".repeat(200);
        assert!(service.hash_password(&long).is_err());
    }
}
