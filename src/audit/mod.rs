//! Assessment audit trail
//!
//! Every submitted pre-profiler and risk profile is recorded with a hash
//! of its answers so a later reader can tell whether the stored answers
//! still match what the client submitted.

use crate::error::AdvisoryError;
use crate::questionnaire::AnswerMap;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    PreProfiler,
    RiskProfile,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::PreProfiler => "pre_profiler",
            AssessmentKind::RiskProfile => "risk_profile",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub audit_id: Uuid,
    pub family_id: Uuid,
    pub onboarding_id: Uuid,
    pub kind: AssessmentKind,
    pub answers: AnswerMap,
    pub outcome: serde_json::Value,
    pub answers_hash: String,
    pub recorded_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn new<T: Serialize>(
        family_id: Uuid,
        onboarding_id: Uuid,
        kind: AssessmentKind,
        answers: AnswerMap,
        outcome: &T,
    ) -> Result<Self> {
        Ok(Self {
            audit_id: Uuid::new_v4(),
            family_id,
            onboarding_id,
            kind,
            answers_hash: compute_answers_hash(kind, &answers),
            answers,
            outcome: serde_json::to_value(outcome)?,
            recorded_at: Utc::now(),
        })
    }

    /// Stored answers still hash to the value taken at submission
    pub fn is_intact(&self) -> bool {
        compute_answers_hash(self.kind, &self.answers) == self.answers_hash
    }
}

/// Append-only assessment trail per family
pub struct AssessmentAuditLog {
    trails: Arc<RwLock<HashMap<Uuid, Vec<AssessmentRecord>>>>,
}

impl AssessmentAuditLog {
    pub fn new() -> Self {
        Self {
            trails: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn record(&self, record: AssessmentRecord) -> Result<Uuid> {
        let audit_id = record.audit_id;
        let mut trails = self.trails.write().await;
        trails.entry(record.family_id).or_default().push(record);
        Ok(audit_id)
    }

    pub async fn get(&self, audit_id: Uuid) -> Result<AssessmentRecord> {
        let trails = self.trails.read().await;
        trails
            .values()
            .flatten()
            .find(|record| record.audit_id == audit_id)
            .cloned()
            .ok_or_else(|| AdvisoryError::NotFound(format!("audit record {}", audit_id)))
    }

    /// Every record for a family in submission order
    pub async fn trail(&self, family_id: Uuid) -> Result<Vec<AssessmentRecord>> {
        let trails = self.trails.read().await;
        Ok(trails.get(&family_id).cloned().unwrap_or_default())
    }

    /// Audit ids for a family, oldest first
    pub async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<Uuid>> {
        let trails = self.trails.read().await;
        Ok(trails
            .get(&family_id)
            .map(|trail| trail.iter().map(|record| record.audit_id).collect())
            .unwrap_or_default())
    }

    /// The most recent submission of one kind, e.g. the current risk profile
    pub async fn latest(
        &self,
        family_id: Uuid,
        kind: AssessmentKind,
    ) -> Result<Option<AssessmentRecord>> {
        let trails = self.trails.read().await;
        Ok(trails
            .get(&family_id)
            .and_then(|trail| trail.iter().rev().find(|record| record.kind == kind))
            .cloned())
    }

    pub async fn verify_integrity(&self, audit_id: Uuid) -> Result<bool> {
        let intact = self.get(audit_id).await?.is_intact();
        if !intact {
            warn!(audit_id = %audit_id, "Assessment answers no longer match their hash");
        }
        Ok(intact)
    }

    /// Ids of a family's records whose answers fail the hash check
    pub async fn tampered_for_family(&self, family_id: Uuid) -> Result<Vec<Uuid>> {
        let trails = self.trails.read().await;
        Ok(trails
            .get(&family_id)
            .map(|trail| {
                trail
                    .iter()
                    .filter(|record| !record.is_intact())
                    .map(|record| record.audit_id)
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Default for AssessmentAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 over the kind tag then each answer pair, hex encoded.
/// Unit and record separators keep `("ab", "c")` distinct from `("a", "bc")`.
pub fn compute_answers_hash(kind: AssessmentKind, answers: &AnswerMap) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"\x1e");

    for (question_id, option_id) in answers {
        hasher.update(question_id.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(option_id.as_bytes());
        hasher.update(b"\x1e");
    }

    hex::encode(hasher.finalize())
}
