use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Well-formed Argon2id hash of no real password, verified against when the
/// subject does not exist so that path costs the same as a wrong password.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$vhtflFp3VK+R74GbYgUyww$fgpZ2HP+1npT1F053p9usbmzNwclMSi9iBaTq+hoee0";

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds no mutable state; one instance is shared behind an `Arc` by every
/// request task.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of every issued token
    ///
    /// # Errors
    /// * `MissingSecret` - `jwt_secret` is empty
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret)?,
            token_ttl,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for the subject.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject_id: impl ToString,
        email: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(subject_id, email)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Reject a login for a subject that does not exist.
    ///
    /// Runs a full password verification against a dummy hash first, so an
    /// unknown subject cannot be told apart from a wrong password by timing.
    pub fn reject_unknown_subject(&self, password: &str) -> AuthenticationError {
        let _ = self.verify_password(password, DUMMY_PASSWORD_HASH);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, where the caller has just proven
    /// knowledge of the password by choosing it.
    pub fn issue_token(&self, subject_id: impl ToString, email: &str) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject_id, email, self.token_ttl)
    }

    /// Validate a token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!", Duration::hours(24))
            .expect("Failed to build authenticator")
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("secret123")
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate("secret123", &hash, "user-123", "alice@example.com")
            .expect("Authentication failed");

        let claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("secret123").unwrap();

        let result = authenticator.authenticate("wrongpass", &hash, "user-123", "a@example.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_reject_unknown_subject_verifies_dummy_hash() {
        let authenticator = authenticator();

        assert_eq!(
            authenticator.verify_password("secret123", DUMMY_PASSWORD_HASH),
            Ok(false)
        );
        assert!(matches!(
            authenticator.reject_unknown_subject("secret123"),
            AuthenticationError::InvalidCredentials
        ));
    }

    #[test]
    fn test_authenticate_malformed_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("secret123", "not-a-phc", "user-123", "a@b.co");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(PasswordError::MalformedHash(_)))
        ));
    }

    #[test]
    fn test_oversized_ttl_fails_instead_of_panicking() {
        let authenticator = Authenticator::new(
            b"test_secret_key_at_least_32_bytes!",
            Duration::hours(10_000_000_000),
        )
        .unwrap();

        assert!(matches!(
            authenticator.issue_token("user-123", "a@b.co"),
            Err(JwtError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_missing_secret() {
        assert!(matches!(
            Authenticator::new(b"", Duration::hours(1)),
            Err(JwtError::MissingSecret)
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let result = authenticator().validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }
}
