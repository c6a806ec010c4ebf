use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserDirectory;

/// Domain service for registration, login, and profile lookup.
///
/// Stateless apart from its injected directory and authenticator; every call
/// is an independent request/response with no retries.
pub struct AuthService<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
}

impl<UD> AuthService<UD>
where
    UD: UserDirectory,
{
    pub fn new(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
        }
    }
}

#[async_trait]
impl<UD> AuthServicePort for AuthService<UD>
where
    UD: UserDirectory,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, UserError> {
        // Fast path only: the unique index on users.email is the real guard.
        if self.directory.exists_by_email(&command.email).await? {
            tracing::info!("Registration rejected: email already registered");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())
            .map_err(|e| UserError::Credential(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            created_at: now,
            updated_at: now,
        };

        // Sign before persisting so a signing failure leaves nothing behind.
        let token = self
            .authenticator
            .issue_token(user.id, user.email.as_str())
            .map_err(|e| UserError::Token(e.to_string()))?;

        let user = self.directory.create(user).await?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthSession { token, user })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError> {
        let email =
            EmailAddress::new(command.email).map_err(|_| UserError::InvalidCredentials)?;

        let Some(user) = self.directory.find_by_email(&email).await? else {
            self.authenticator.reject_unknown_subject(&command.password);
            return Err(UserError::InvalidCredentials);
        };

        let result = self
            .authenticator
            .authenticate(&command.password, &user.password_hash, user.id, user.email.as_str())
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => {
                    tracing::warn!(user_id = %user.id, "Stored password hash unusable: {}", err);
                    UserError::InvalidCredentials
                }
                AuthenticationError::JwtError(err) => UserError::Token(err.to_string()),
            })?;

        tracing::debug!(user_id = %user.id, "User logged in");

        Ok(AuthSession {
            token: result.access_token,
            user,
        })
    }

    async fn get_profile(&self, id: &UserId) -> Result<User, UserError> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
