//! Argon2id password hashing.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the algorithm, parameters and salt travel with the hash and verification
//! never needs outside configuration.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicU64, Ordering},
};
use tracing::error;

use super::error::AuthError;

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // digest of a random secret, verified against when the identifier is unknown
    dummy: Arc<OnceLock<String>>,
    verifications: Arc<AtomicU64>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy: Arc::new(OnceLock::new()),
            verifications: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Argon2 verifications run so far by this hasher and its clones.
    #[must_use]
    pub fn verifications(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }

    /// Hash a secret with a fresh random salt.
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if Argon2 rejects the input.
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hashing(err.to_string()))
    }

    /// Check a secret against a stored digest.
    ///
    /// The final comparison is constant time. A digest that does not parse is a
    /// mismatch, not an error.
    #[must_use]
    pub fn verify(&self, digest: &str, secret: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.verifications.fetch_add(1, Ordering::Relaxed);
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`Self::hash`] on the blocking pool.
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if hashing fails or the task is cancelled.
    pub async fn hash_blocking(&self, secret: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|err| AuthError::Hashing(format!("task join error: {err}")))?
    }

    /// [`Self::verify`] on the blocking pool.
    pub async fn verify_blocking(&self, digest: &str, secret: &str) -> bool {
        let hasher = self.clone();
        let digest = digest.to_owned();
        let secret = secret.to_owned();
        match tokio::task::spawn_blocking(move || hasher.verify(&digest, &secret)).await {
            Ok(matched) => matched,
            Err(err) => {
                error!("Password verification task failed: {err}");
                false
            }
        }
    }

    /// Spend one verification on a digest nobody owns.
    ///
    /// Callers run this when the identifier is unknown, so a missing account
    /// takes as long to reject as a wrong password.
    pub async fn verify_dummy_blocking(&self, secret: &str) {
        let hasher = self.clone();
        let secret = secret.to_owned();
        let task = tokio::task::spawn_blocking(move || {
            let digest = hasher.dummy_digest().to_owned();
            hasher.verify(&digest, &secret)
        });
        if let Err(err) = task.await {
            error!("Dummy verification task failed: {err}");
        }
    }

    fn dummy_digest(&self) -> &str {
        self.dummy.get_or_init(|| {
            let secret = SaltString::generate(&mut OsRng);
            self.hash(secret.as_str()).unwrap_or_else(|err| {
                error!("Failed to build dummy digest: {err}");
                String::new()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordHasher;

    #[test]
    fn verify_accepts_own_hash() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("secret1").ok();
        assert!(digest.is_some_and(|digest| hasher.verify(&digest, "secret1")));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("secret1").unwrap_or_default();
        assert!(!hasher.verify(&digest, "secret2"));
        assert!(!hasher.verify(&digest, ""));
    }

    #[test]
    fn hash_is_salted() {
        let hasher = PasswordHasher::default();
        let first = hasher.hash("same").unwrap_or_default();
        let second = hasher.hash("same").unwrap_or_default();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(hasher.verify(&first, "same"));
        assert!(hasher.verify(&second, "same"));
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        let hasher = PasswordHasher::default();
        assert!(!hasher.verify("", "secret"));
        assert!(!hasher.verify("not-a-phc-string", "secret"));
        assert!(!hasher.verify("$argon2id$v=19$broken", "secret"));
    }

    #[test]
    fn dummy_digest_is_argon2id() {
        let hasher = PasswordHasher::default();
        let digest = hasher.dummy_digest().to_owned();
        assert!(digest.starts_with("$argon2id$"));
        assert_eq!(hasher.dummy_digest(), digest);
        assert!(!hasher.verify(&digest, "secret"));
    }

    #[tokio::test]
    async fn dummy_verification_runs_argon2() {
        let hasher = PasswordHasher::default();
        let clone = hasher.clone();
        assert_eq!(hasher.verifications(), 0);
        clone.verify_dummy_blocking("secret").await;
        assert_eq!(hasher.verifications(), 1);
        hasher.verify_dummy_blocking("").await;
        assert_eq!(clone.verifications(), 2);
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash_blocking("pa:ss").await.unwrap_or_default();
        assert!(hasher.verify_blocking(&digest, "pa:ss").await);
        assert!(!hasher.verify_blocking(&digest, "pa:sS").await);
    }
}
