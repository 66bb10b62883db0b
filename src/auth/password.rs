use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id hashing with a pre-computed dummy hash, so lookups for unknown
/// users cost the same as a wrong password.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl Hasher {
    pub fn new(params: Params) -> anyhow::Result<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "breathtrack-dummy-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// OWASP-recommended defaults of the argon2 crate.
    pub fn standard() -> anyhow::Result<Self> {
        Self::new(Params::default())
    }

    /// Minimum-cost parameters; unit tests only.
    #[cfg(test)]
    pub fn fast() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
            .expect("minimum argon2 params are valid");
        Self::new(params).expect("hashing with minimum params")
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        hash_with(&self.argon2, plain)
    }

    /// Verifies `plain` against a PHC hash string. Parameters are taken from
    /// the hash itself, so hashes made with other costs still verify.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burns one verification against the dummy hash; always false.
    pub fn verify_dummy(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.dummy_hash);
        false
    }

    /// Login check against a stored hash, if any. A missing or unreadable
    /// hash is a failed check that still costs one verification.
    pub fn check(&self, plain: &str, stored: Option<&str>) -> bool {
        match stored {
            Some(hash) => self.verify(plain, hash).unwrap_or(false),
            None => self.verify_dummy(plain),
        }
    }
}

fn hash_with(argon2: &Argon2<'static>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = Hasher::fast();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = Hasher::fast();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = Hasher::fast();
        let a = hasher.hash("breathe").unwrap();
        let b = hasher.hash("breathe").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("breathe", &a).unwrap());
        assert!(hasher.verify("breathe", &b).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = Hasher::fast()
            .verify("anything", "not-a-valid-hash")
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        let hasher = Hasher::fast();
        assert!(!hasher.verify_dummy("breathtrack-dummy-password"));
    }

    #[test]
    fn check_handles_missing_and_garbled_hashes() {
        let hasher = Hasher::fast();
        let hash = hasher.hash("breathe").unwrap();
        assert!(hasher.check("breathe", Some(&hash)));
        assert!(!hasher.check("exhale", Some(&hash)));
        assert!(!hasher.check("breathe", None));
        assert!(!hasher.check("breathe", Some("garbled")));
    }
}
