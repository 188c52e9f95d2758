use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2 hash with a fresh random salt. The PHC string embeds salt and
/// parameters, so nothing else needs to be stored.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow::anyhow!("password hashing failed")
        })
}

/// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("stored password hash is malformed")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_original_password() {
        let hash = hash_password("applicant-pw-2024!").expect("hash");
        assert!(verify_password("applicant-pw-2024!", &hash).expect("verify"));
    }

    #[test]
    fn rejects_a_different_password() {
        let hash = hash_password("applicant-pw-2024!").expect("hash");
        assert!(!verify_password("applicant-pw-2025!", &hash).expect("verify"));
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let first = hash_password("recruiter123").expect("hash");
        let second = hash_password("recruiter123").expect("hash");
        assert_ne!(first, second);
        assert!(verify_password("recruiter123", &second).expect("verify"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("whatever", "plaintext-not-a-phc-string").is_err());
    }
}
