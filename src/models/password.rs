use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::SecurityConfig;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
pub struct WeakPassword;

/// Minimum bar for any password a user sets, at registration or later.
pub fn check_strength(password: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WeakPassword);
    }
    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check `password` against a PHC hash string. Unparsable hashes never match.
///
/// Parameters are read from the hash itself, so hashes produced with any
/// `SecurityConfig` verify here.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_configured_params() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let hash = hash_password("hunter2", Some(&config)).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024,t=1,p=1"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_check_strength_counts_characters() {
        assert_eq!(check_strength("short"), Err(WeakPassword));
        assert_eq!(check_strength(""), Err(WeakPassword));
        assert!(check_strength("12345678").is_ok());
        // Eight characters, more than eight bytes.
        assert!(check_strength("pässwörd").is_ok());
    }

    #[test]
    fn test_garbage_hash_does_not_verify() {
        assert!(!verify_password("secret", "not-a-phc-string"));
        assert!(!verify_password("secret", ""));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 0,
            argon2_time_cost: 0,
            argon2_parallelism: 0,
        };
        assert!(hash_password("secret", Some(&config)).is_err());
    }
}
