use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Slow salted one-way hashing with a configurable work factor.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(security: &SecurityConfig) -> Self {
        Self { cost: security.bcrypt_cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, ApiError> {
        if plaintext.is_empty() {
            return Err(ApiError::invalid_input("Password must not be empty", vec![]));
        }
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| ApiError::configuration(format!("password hashing failed: {}", e)))
    }

    /// Never errors: empty inputs and undecodable digests verify as false.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if plaintext.is_empty() || digest.is_empty() {
            return false;
        }
        bcrypt::verify(plaintext, digest).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // Minimum cost keeps the test suite quick.
        PasswordHasher { cost: 4 }
    }

    #[test]
    fn hash_then_verify() {
        let hasher = hasher();
        let digest = hasher.hash("Passw0rd!").unwrap();
        assert!(hasher.verify("Passw0rd!", &digest));
        assert!(!hasher.verify("passw0rd!", &digest));
    }

    #[test]
    fn empty_plaintext_fails_hash() {
        assert_eq!(hasher().hash("").unwrap_err().status_code(), 400);
    }

    #[test]
    fn verify_is_total() {
        let hasher = hasher();
        assert!(!hasher.verify("", "whatever"));
        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "not-a-bcrypt-digest"));
    }
}
