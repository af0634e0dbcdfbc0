//! Authentication over an injected session store
//!
//! A signed-in user is stored as JSON under a single fixed key. Sign-in
//! failures never say whether the identifier or the password was wrong.

pub mod directory;
pub mod session;

pub use directory::{
    hash_password, verify_password, CredentialRecord, InMemoryUserDirectory, UserDirectory,
};
pub use session::{build_session_store, InMemorySessionStore, PostgresSessionStore, SessionStore};

use crate::error::AdvisoryError;
use crate::models::{User, UserRole};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const SESSION_KEY: &str = "wealth_crm.session";

/// What is written under `SESSION_KEY`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub signed_in_at: DateTime<Utc>,
}

pub struct AuthService {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn UserDirectory>,
}

impl AuthService {
    pub fn new(sessions: Arc<dyn SessionStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            sessions,
            directory,
        }
    }

    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<User> {
        let record = match self.directory.find(identifier).await? {
            Some(record) if record.verify(password)? => record,
            _ => {
                warn!(identifier, "Sign-in rejected");
                return Err(AdvisoryError::InvalidCredentials);
            }
        };

        let session = AuthSession {
            user: record.user,
            signed_in_at: Utc::now(),
        };
        self.sessions
            .set(SESSION_KEY, serde_json::to_string(&session)?)
            .await?;

        info!(
            user_id = %session.user.user_id,
            role = %session.user.role,
            "User signed in"
        );

        Ok(session.user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.sessions.remove(SESSION_KEY).await?;
        info!("User signed out");
        Ok(())
    }

    /// The stored session, if any. A payload that no longer parses is
    /// treated as signed out and cleared.
    pub async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(raw) = self.sessions.get(SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!("Discarding unreadable session: {}", error);
                self.sessions.remove(SESSION_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.current_session().await?.map(|s| s.user))
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_session().await?.is_some())
    }

    /// Signed-in user holding one of `roles`; an empty slice admits any role
    pub async fn authorize(&self, roles: &[UserRole]) -> Result<User> {
        let user = self
            .current_user()
            .await?
            .ok_or(AdvisoryError::NotAuthenticated)?;

        if !roles.is_empty() && !roles.contains(&user.role) {
            return Err(AdvisoryError::Forbidden(format!(
                "role {} is not permitted",
                user.role
            )));
        }

        Ok(user)
    }
}
