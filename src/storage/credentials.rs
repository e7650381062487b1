//! Argon2id password hashing for player accounts.

use argon2::{Algorithm, Argon2, Params, Version};
use log::warn;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::config::SecurityConfig;
use crate::game::errors::GameError;

/// Hashes and verifies passwords as PHC strings.
#[derive(Clone, Default)]
pub struct Credentials {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `[security.argon2]`, filling unset values from the Argon2 defaults.
    pub fn from_config(security: &SecurityConfig) -> Self {
        let Some(a) = &security.argon2 else {
            return Self::new();
        };
        let builder = Params::DEFAULT;
        let mem = a.memory_kib.unwrap_or(builder.m_cost());
        let time = a.time_cost.unwrap_or(builder.t_cost());
        let para = a.parallelism.unwrap_or(builder.p_cost());
        match Params::new(mem, time, para, None) {
            Ok(params) => Self {
                argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            },
            Err(e) => {
                warn!("Invalid argon2 parameters ({}); using defaults", e);
                Self::new()
            }
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, GameError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| GameError::PasswordHash(format!("password hash failure: {e}")))?;
        Ok(hash.to_string())
    }

    /// Boolean credential check. Empty or corrupt stored hashes never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        if stored.is_empty() {
            return false;
        }
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Corrupt password hash: {e}");
                false
            }
        }
    }
}
