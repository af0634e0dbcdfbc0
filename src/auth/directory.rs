//! User directory: credential lookup by email or username

use crate::error::AdvisoryError;
use crate::models::User;
use crate::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A user plus the PHC-format argon2 hash of their password
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub user: User,
    pub password_hash: String,
}

impl CredentialRecord {
    pub fn new(user: User, password: &str) -> Result<Self> {
        Ok(Self {
            user,
            password_hash: hash_password(password)?,
        })
    }

    /// Errors only when the stored hash is not a valid PHC string
    pub fn verify(&self, password: &str) -> Result<bool> {
        verify_password(password, &self.password_hash)
    }

    fn matches(&self, identifier: &str) -> bool {
        self.user.email.eq_ignore_ascii_case(identifier)
            || self.user.username.eq_ignore_ascii_case(identifier)
    }
}

/// Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdvisoryError::PasswordHashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AdvisoryError::PasswordHashError(format!("invalid hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Case-insensitive match on email or username
    async fn find(&self, identifier: &str) -> Result<Option<CredentialRecord>>;
}

pub struct InMemoryUserDirectory {
    records: Arc<RwLock<Vec<CredentialRecord>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<CredentialRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Load a JSON array of `CredentialRecord`s
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<CredentialRecord> = serde_json::from_str(&raw)?;

        info!(path = %path.display(), users = records.len(), "Loaded user directory");

        Ok(Self::with_records(records))
    }

    /// Add a record; email and username must be unused
    pub async fn insert(&self, record: CredentialRecord) -> Result<()> {
        let mut records = self.records.write().await;

        if records
            .iter()
            .any(|r| r.matches(&record.user.email) || r.matches(&record.user.username))
        {
            return Err(AdvisoryError::InvalidInput(format!(
                "user '{}' already exists",
                record.user.username
            )));
        }

        records.push(record);
        Ok(())
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, identifier: &str) -> Result<Option<CredentialRecord>> {
        let identifier = identifier.trim();
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.matches(identifier)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use uuid::Uuid;

    fn priya() -> CredentialRecord {
        CredentialRecord::new(
            User {
                user_id: Uuid::new_v4(),
                username: "priya.rm".to_string(),
                email: "Priya@WealthDesk.in".to_string(),
                display_name: "Priya Nair".to_string(),
                role: UserRole::RelationshipManager,
            },
            "correct horse",
        )
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("secret", &hash).unwrap());
        assert!(!verify_password("Secret", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);

        assert!(verify_password("secret", &a).unwrap());
        assert!(verify_password("secret", &b).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_an_error() {
        let result = verify_password("secret", "5e884898da28047151d0e56f8dc629");
        assert!(matches!(result, Err(AdvisoryError::PasswordHashError(_))));
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let directory = InMemoryUserDirectory::with_records(vec![priya()]);

        assert!(directory.find("priya@wealthdesk.in").await.unwrap().is_some());
        assert!(directory.find("PRIYA.RM").await.unwrap().is_some());
        assert!(directory.find("someone.else").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let directory = InMemoryUserDirectory::new();
        directory.insert(priya()).await.unwrap();
        assert!(directory.insert(priya()).await.is_err());
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("users-{}.json", Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_string(&vec![priya()]).unwrap()).unwrap();

        let directory = InMemoryUserDirectory::from_json_file(&path).unwrap();
        let found = directory.find("priya.rm").await.unwrap().unwrap();
        assert!(found.password_hash.starts_with("$argon2"));
        assert!(found.verify("correct horse").unwrap());
        assert!(!found.verify("wrong").unwrap());

        std::fs::remove_file(&path).unwrap();
        assert!(InMemoryUserDirectory::from_json_file(&path).is_err());
    }
}
