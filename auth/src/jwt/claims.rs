use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Session token payload.
///
/// Carries everything a protected route needs to trust the caller for the
/// lifetime of the token, so verification never touches storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (identity identifier)
    pub sub: String,

    /// Email of the subject at issuance time
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for an identity expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `subject_id` - Unique identity identifier
    /// * `email` - Identity email
    /// * `ttl` - Lifetime of the token
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry falls outside the representable range
    pub fn for_user(
        subject_id: impl ToString,
        email: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed("token expiry is out of range".to_string())
        })?;

        Ok(Self {
            sub: subject_id.to_string(),
            email: email.into(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}
