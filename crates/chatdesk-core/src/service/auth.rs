//! Authentication service: registration, login, logout, token validation.

use chatdesk_types::error::{AuthError, RepositoryError};
use chatdesk_types::user::{AuthSession, Identity, NewUser, User, UserRole, UserStatus};
use tracing::info;

use crate::repository::user::UserRepository;
use crate::service::hash::PasswordHasher;
use crate::service::token::TokenIssuer;

/// Account lifecycle over a user repository, a password hasher and a token issuer.
pub struct AuthService<U: UserRepository, H: PasswordHasher, T: TokenIssuer> {
    users: U,
    hasher: H,
    tokens: T,
}

impl<U: UserRepository, H: PasswordHasher, T: TokenIssuer> AuthService<U, H, T> {
    pub fn new(users: U, hasher: H, tokens: T) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Create an account and sign it in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<AuthSession, AuthError> {
        let user = self.create_user(username, password, role, UserStatus::Online).await?;
        info!(user_id = user.id, username = %user.username, role = %user.role, "registered user");
        self.session_for(user)
    }

    /// Create an account without signing it in (used by the CLI).
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
        status: UserStatus,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let password_hash = self.hasher.hash(password)?;
        let new_user = NewUser {
            username: username.to_string(),
            password_hash,
            role,
            status,
        };
        match self.users.create(&new_user).await {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent registration.
            Err(RepositoryError::Conflict(_)) => Err(AuthError::UsernameTaken(username.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials, mark the user online, and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.users.set_status(user.id, UserStatus::Online).await?;
        user.status = UserStatus::Online;
        info!(user_id = user.id, "user logged in");
        self.session_for(user)
    }

    pub async fn logout(&self, identity: &Identity) -> Result<(), AuthError> {
        self.users
            .set_status(identity.user_id, UserStatus::Offline)
            .await?;
        info!(user_id = identity.user_id, "user logged out");
        Ok(())
    }

    /// Resolve a bearer token to the identity it carries.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.verify(token)
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(&Identity::from(&user))?;
        Ok(AuthSession { token, user })
    }
}
