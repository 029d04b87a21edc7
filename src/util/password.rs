//! Password hashing and verification utilities
//!
//! Account passwords are stored as bcrypt hashes with a work factor of 12.

use tracing::{debug, error, info};

pub const BCRYPT_COST: u32 = 12;

/// Error types for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
}

pub trait PasswordUtils {
    /// Hashes the given password with bcrypt
    fn hash_password(password: &str) -> Result<String, PasswordError>;

    /// Verifies the given password against the stored hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Generates a random password of specified length
    fn generate_random_password(length: usize) -> String;
}

pub struct PasswordUtilsImpl;

impl PasswordUtils for PasswordUtilsImpl {
    fn hash_password(password: &str) -> Result<String, PasswordError> {
        debug!("Hashing password");
        match bcrypt::hash(password, BCRYPT_COST) {
            Ok(hash) => {
                info!("Password successfully hashed");
                Ok(hash)
            }
            Err(err) => {
                error!("Failed to hash password: {}", err);
                Err(PasswordError::HashingFailed(err.to_string()))
            }
        }
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        debug!("Verifying password against hash");
        match bcrypt::verify(password, hash) {
            Ok(valid) => {
                debug!("Password verification completed: {}", valid);
                Ok(valid)
            }
            Err(err) => {
                error!("Password verification error: {}", err);
                Err(PasswordError::VerificationFailed(err.to_string()))
            }
        }
    }

    fn generate_random_password(length: usize) -> String {
        use rand::Rng;

        let length = length.max(8);
        debug!("Generating random password of length {}", length);

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                abcdefghijklmnopqrstuvwxyz\
                                0123456789";
        let mut rng = rand::thread_rng();

        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordUtilsImpl::hash_password("secret123").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(PasswordUtilsImpl::verify_password("secret123", &hash).unwrap());
        assert!(!PasswordUtilsImpl::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_random_password_length() {
        assert_eq!(PasswordUtilsImpl::generate_random_password(16).len(), 16);
        // Minimum length is enforced
        assert_eq!(PasswordUtilsImpl::generate_random_password(4).len(), 8);
    }
}
