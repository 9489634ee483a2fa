//! Credential hashing. Argon2id, PHC string format, fresh 16-byte salt per hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    /// `memory_kib` and `iterations` are the Argon2 m_cost and t_cost.
    pub fn new(memory_kib: u32, iterations: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::Internal(format!("argon2 params: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AppError::Internal(format!("salt generation: {e}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("salt encoding: {e}")))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing: {e}")))
    }

    /// Constant-time check of `password` against a stored PHC string. A
    /// malformed stored hash never matches.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        // Parameters come from the PHC string, so hashes made with older
        // settings still verify.
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}
