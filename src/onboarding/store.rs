//! Onboarding session persistence
//!
//! In-memory for now; the trait is the seam for a database-backed store.

use super::state::OnboardingState;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn save(&self, state: &OnboardingState) -> Result<()>;
    async fn load(&self, onboarding_id: Uuid) -> Result<Option<OnboardingState>>;
    async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<OnboardingState>>;
}

pub struct InMemoryOnboardingStore {
    sessions: Arc<RwLock<HashMap<Uuid, OnboardingState>>>,
}

impl InMemoryOnboardingStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryOnboardingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OnboardingStore for InMemoryOnboardingStore {
    async fn save(&self, state: &OnboardingState) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(state.onboarding_id, state.clone());
        Ok(())
    }

    async fn load(&self, onboarding_id: Uuid) -> Result<Option<OnboardingState>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&onboarding_id).cloned())
    }

    /// Oldest session first
    async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<OnboardingState>> {
        let sessions = self.sessions.read().await;

        let mut found: Vec<OnboardingState> = sessions
            .values()
            .filter(|s| s.family_id == family_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.started_at);

        Ok(found)
    }
}
