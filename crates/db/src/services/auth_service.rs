// Authentication helpers: bcrypt for passwords, SHA-256 for session tokens.
use bcrypt::{hash, verify, DEFAULT_COST};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
        verify(password, hash)
    }

    pub fn generate_session_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Session tokens are already high-entropy, so a fast hash is fine here;
    /// they are verified on every authenticated request.
    pub fn hash_session_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
