use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;

/// Hash a password with Argon2id, using tuned params when a config is given.
///
/// Runs on a blocking thread; Argon2 is deliberately CPU- and memory-hard
/// and would stall the async runtime if run inline.
pub async fn hash_password(password: String, config: Option<SecurityConfig>) -> Result<String> {
    task::spawn_blocking(move || hash_password_sync(&password, config.as_ref()))
        .await
        .map_err(|e| anyhow::anyhow!("Hashing task failed: {e}"))?
}

pub fn hash_password_sync(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
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

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
}

/// Check a candidate password against a stored Argon2 hash.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| anyhow::anyhow!("Verification task failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter2".to_string(), None).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(
            verify_password("hunter2".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_stored_hash_never_verifies() {
        assert!(
            !verify_password("anything".to_string(), "not-a-hash".to_string())
                .await
                .unwrap()
        );
    }

    #[test]
    fn custom_params_are_honored() {
        let cfg = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        };
        let hash = hash_password_sync("pw", Some(&cfg)).unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));
    }
}
