//! Admin password check for the stats endpoints

use super::password::verify_password;

#[derive(Clone, Default)]
pub struct AdminAuth {
    password_hash: Option<String>,
}

impl AdminAuth {
    pub fn new(password_hash: Option<String>) -> Self {
        Self {
            password_hash: password_hash.filter(|h| !h.trim().is_empty()),
        }
    }

    /// `ADMIN_PASSWORD_HASH`, an argon2 PHC string
    pub fn from_env() -> Self {
        let auth = Self::new(std::env::var("ADMIN_PASSWORD_HASH").ok());
        if !auth.is_configured() {
            log::warn!("ADMIN_PASSWORD_HASH is not set, admin endpoints will reject every request");
        }
        auth
    }

    pub fn is_configured(&self) -> bool {
        self.password_hash.is_some()
    }

    /// False when no hash is configured or the stored hash cannot be parsed
    pub fn verify(&self, password: Option<&str>) -> bool {
        let (Some(hash), Some(password)) = (self.password_hash.as_deref(), password) else {
            return false;
        };
        match verify_password(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                log::error!("ADMIN_PASSWORD_HASH could not be parsed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    #[test]
    fn test_unconfigured_rejects_everything() {
        let auth = AdminAuth::new(None);
        assert!(!auth.verify(Some("anything")));
        assert!(!auth.verify(None));
        assert!(!AdminAuth::new(Some("  ".to_string())).is_configured());
    }

    #[test]
    fn test_verify() {
        let auth = AdminAuth::new(Some(hash_password("dashboard-2025").unwrap()));
        assert!(auth.verify(Some("dashboard-2025")));
        assert!(!auth.verify(Some("dashboard-2024")));
        assert!(!auth.verify(None));
    }

    #[test]
    fn test_malformed_hash_rejects() {
        let auth = AdminAuth::new(Some("plaintext-password".to_string()));
        assert!(!auth.verify(Some("plaintext-password")));
    }
}
