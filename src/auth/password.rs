// Password hashing
// bcrypt carries its own salt and verifies in constant time

use bcrypt::{hash, verify};

/// Hash a password with the given bcrypt cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, String> {
    hash(password, cost).map_err(|e| format!("Failed to hash password: {}", e))
}

/// Verify a password against a stored bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    verify(password, password_hash).map_err(|e| format!("Failed to verify password: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MIN_BCRYPT_COST;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("p1-secret", MIN_BCRYPT_COST).unwrap();

        assert_ne!(hashed, "p1-secret");
        assert!(verify_password("p1-secret", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("same", MIN_BCRYPT_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("same", &first).unwrap());
        assert!(verify_password("same", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
