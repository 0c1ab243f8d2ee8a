//! Argon2id hashing for the admin password and stored access keys

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::AuthError;

const MIN_ADMIN_PASSWORD_CHARS: usize = 12;
const MAX_ADMIN_PASSWORD_BYTES: usize = 128;

/// PHC string for `secret` with a fresh salt
pub fn hash_password(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// `Ok(false)` on a mismatch; a hash that is not a PHC string is an error
pub fn verify_password(secret: &str, phc: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(phc).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

/// Strength rules applied before `admin hash-password` prints a hash
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_ADMIN_PASSWORD_CHARS {
        return Err("Admin password must be at least 12 characters long");
    }
    if password.len() > MAX_ADMIN_PASSWORD_BYTES {
        return Err("Admin password must be at most 128 bytes long");
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    match (has_letter, has_digit) {
        (false, _) => Err("Admin password must contain a letter"),
        (_, false) => Err("Admin password must contain a digit"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-42").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-42", &hash).unwrap());
        assert!(!verify_password("wrong-horse-42", &hash).unwrap());
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let first = hash_password("demo-key-2024").unwrap();
        let second = hash_password("demo-key-2024").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("demo-key-2024", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert_matches!(verify_password("x", "not-a-phc-string"), Err(AuthError::Hash(_)));
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("dashboard-2025").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("no-digits-in-here").is_err());
        assert!(validate_password("123456789012").is_err());
    }
}
