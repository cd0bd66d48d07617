//! Password hashing and verification using Argon2id.
//!
//! Hashing fails only on internal fault, never on input shape. Verification
//! reports mismatch as `Ok(false)`; only unreadable stored hashes or engine
//! faults surface as errors.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::errors::{MotorlotError, Result};

pub fn password_hasher() -> Argon2<'static> {
    // Tuned for interactive logins: Argon2id with the OWASP moderate profile
    // keeps verification well inside the login latency budget while retaining
    // side-channel protections.
    const MEMORY_COST_KIB: u32 = 19_456; // 19 MiB
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a plaintext password into a PHC-formatted string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = password_hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MotorlotError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| MotorlotError::internal(format!("Stored password hash unreadable: {}", e)))?;

    match password_hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(MotorlotError::internal(format!("Password verification failed: {}", e))),
    }
}
