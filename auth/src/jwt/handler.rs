use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Issues and verifies HS256 session tokens.
///
/// Verification is purely a function of the token and the signing secret;
/// there is no server-side session store and no revocation list.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration, never from code
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Mint a token for `subject_id` that expires `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry is out of range or signing failed
    pub fn issue(
        &self,
        subject_id: impl ToString,
        email: impl Into<String>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.encode(&Claims::for_user(subject_id, email, ttl)?)
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, then return the embedded claims.
    ///
    /// # Errors
    /// * `Expired` - Current time is past `exp`
    /// * `BadSignature` - Signature does not match the secret
    /// * `Malformed` - Token is structurally invalid or misses required claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::BadSignature
                }
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_verify() {
        let handler = JwtHandler::new(SECRET).unwrap();

        let token = handler
            .issue("user-123", "alice@example.com", Duration::hours(24))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_issue_with_oversized_ttl_fails() {
        let handler = JwtHandler::new(SECRET).unwrap();

        let result = handler.issue(
            "user-123",
            "alice@example.com",
            Duration::hours(10_000_000_000),
        );

        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(JwtHandler::new(b""), Err(JwtError::MissingSecret)));
    }

    #[test]
    fn test_verify_expired_token() {
        let handler = JwtHandler::new(SECRET).unwrap();
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: "user-123".to_string(),
            email: "alice@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = handler.encode(&claims).unwrap();

        assert_eq!(handler.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let issuer = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!").unwrap();
        let verifier = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!").unwrap();

        let token = issuer
            .issue("user-123", "alice@example.com", Duration::hours(1))
            .unwrap();

        assert_eq!(verifier.verify(&token), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_verify_garbage() {
        let handler = JwtHandler::new(SECRET).unwrap();

        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_tampered_payload() {
        let handler = JwtHandler::new(SECRET).unwrap();
        let token = handler
            .issue("user-123", "alice@example.com", Duration::hours(1))
            .unwrap();
        let other = handler
            .issue("user-456", "mallory@example.com", Duration::hours(1))
            .unwrap();

        // Splice the payload of one token onto the signature of another.
        let head: Vec<&str> = token.split('.').collect();
        let tail: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", head[0], tail[1], head[2]);

        assert_eq!(handler.verify(&forged), Err(JwtError::BadSignature));
    }
}
