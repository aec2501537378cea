pub mod password;

use async_trait::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{User, UserDraft};
use crate::database::{Repository, StoreError};
use crate::session::Session;

pub use password::{hash_password, verify_password};

/// Login state carried by `axum_login` for the current request
pub type AuthSession = axum_login::AuthSession<Authenticator>;

/// Session key remembering which principal the session was logged in as.
/// Lets a request whose login was dropped tell "user deleted" from "never
/// logged in".
pub const PRINCIPAL_KEY: &str = "auth.principal";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    #[error("Session refers to user {0} which no longer exists")]
    PrincipalNotFound(Uuid),

    #[error("Session data unreadable: {0}")]
    Session(String),

    #[error("User store error: {0}")]
    Store(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

/// The authenticated user as seen by handlers and views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

impl AuthUser for User {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    /// Changing the password hash invalidates every session logged in
    /// with the old one
    fn session_auth_hash(&self) -> &[u8] {
        self.password_hash.as_bytes()
    }
}

/// Authentication outcome attached to every request that passes the
/// session stage. `Error` keeps "session corrupt" distinct from
/// "not logged in"; both leave `current_user()` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(Principal),
    Anonymous,
    Error(AuthError),
}

impl AuthState {
    pub fn current_user(&self) -> Option<&Principal> {
        match self {
            AuthState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Email and password checked against the stored argon2 hash.
///
/// Installed on the session layer as the `axum_login` backend, which
/// calls `get_user` for every request whose session carries a login.
#[derive(Clone)]
pub struct Authenticator {
    users: Repository<User>,
}

impl Authenticator {
    pub fn new(users: Repository<User>) -> Self {
        Self { users }
    }

    /// Classify the request's login. `user` is what the login layer
    /// resolved; when it is gone but the session still remembers a
    /// principal, the reason becomes `AuthState::Error`. Never fails.
    pub async fn deserialize_user(&self, session: &Session, user: Option<User>) -> AuthState {
        let remembered: Option<Uuid> = match session.get(PRINCIPAL_KEY).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Unreadable principal in session: {}", e);
                return AuthState::Error(AuthError::Session(e.to_string()));
            }
        };

        if let Some(user) = user {
            if remembered != Some(user.id) {
                if let Err(e) = session.insert(PRINCIPAL_KEY, user.id).await {
                    tracing::warn!("Failed to remember principal {}: {}", user.id, e);
                }
            }
            return AuthState::Authenticated(Principal::from(user));
        }

        let Some(user_id) = remembered else {
            return AuthState::Anonymous;
        };

        match self.users.select_one(user_id).await {
            Ok(None) => {
                tracing::warn!("Session refers to missing user {}", user_id);
                AuthState::Error(AuthError::PrincipalNotFound(user_id))
            }
            Err(e) => {
                tracing::error!("Failed to load user {} for session: {}", user_id, e);
                AuthState::Error(e.into())
            }
            Ok(Some(_)) => {
                // The login was revoked, e.g. by a password change
                if let Err(e) = session.remove::<Uuid>(PRINCIPAL_KEY).await {
                    tracing::warn!("Failed to forget principal {}: {}", user_id, e);
                }
                AuthState::Anonymous
            }
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);
        if self.users.find_one_by("email", json!(email)).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        let draft = UserDraft {
            username: username.trim().to_string(),
            email,
            password_hash: hash_password(password)?,
        };
        let user = self.users.insert(&draft).await?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }
}

#[async_trait]
impl AuthnBackend for Authenticator {
    type User = User;
    type Credentials = Credentials;
    type Error = AuthError;

    async fn authenticate(&self, credentials: Credentials) -> Result<Option<User>, AuthError> {
        let email = normalize_email(&credentials.email);
        let Some(user) = self.users.find_one_by("email", json!(email)).await? else {
            return Ok(None);
        };

        if !verify_password(&user.password_hash, &credentials.password) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Lookup failures are logged and reported as "no user" so the login
    /// layer never turns them into an error response; `deserialize_user`
    /// recovers the reason.
    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<User>, AuthError> {
        match self.users.select_one(*user_id).await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::error!("Failed to load user {}: {}", user_id, e);
                Ok(None)
            }
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
