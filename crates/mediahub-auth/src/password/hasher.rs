//! Argon2id password hashing and verification.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash as PhcHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use mediahub_core::config::AuthConfig;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_entity::PasswordHash;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway secret under the same parameters, verified
    /// against when no account matched so both login failures cost the same.
    decoy: PasswordHash,
    /// Argon2 verifications run so far.
    verifications: Arc<AtomicU64>,
}

impl PasswordHasher {
    /// Creates a hasher with the cost parameters from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        let mut hasher = Self {
            params,
            decoy: PasswordHash::from_phc(String::new()),
            verifications: Arc::new(AtomicU64::new(0)),
        };
        hasher.decoy = hasher.hash_password("mediahub-decoy-credential")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// An empty password is rejected; nothing is persisted here.
    pub fn hash_password(&self, password: &str) -> AppResult<PasswordHash> {
        if password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(PasswordHash::from_phc(hash.to_string()))
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong password. A stored hash that does
    /// not parse is corrupted state and surfaces as an internal error.
    pub fn verify_password(&self, password: &str, stored: &PasswordHash) -> AppResult<bool> {
        let parsed = PhcHash::new(stored.as_phc())
            .map_err(|e| AppError::internal(format!("Stored password hash is corrupt: {e}")))?;

        self.verifications.fetch_add(1, Ordering::Relaxed);
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Runs a full verification against the decoy hash and discards the
    /// outcome.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify_password(password, &self.decoy);
    }

    /// Number of Argon2 verifications this hasher (and its clones) has run.
    pub fn verification_count(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }
}
