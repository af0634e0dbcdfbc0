//! Client onboarding workflow
//!
//! `OnboardingService` drives an `OnboardingState` through its steps,
//! persisting each change and leaving an audit record and a timeline
//! event behind for every submitted assessment.

pub mod state;
pub mod store;

pub use state::{OnboardingState, OnboardingStatus};
pub use store::{InMemoryOnboardingStore, OnboardingStore};

use crate::audit::{AssessmentAuditLog, AssessmentKind, AssessmentRecord};
use crate::classifier::PreProfilerResults;
use crate::error::AdvisoryError;
use crate::messaging::{Timeline, TimelineEventKind};
use crate::models::{BasicInfo, OnboardingFamilyMember};
use crate::questionnaire::{PreProfilerAnswers, RiskProfileAnswers};
use crate::risk::RiskScoreResult;
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub struct OnboardingService {
    store: Arc<dyn OnboardingStore>,
    audit_log: Arc<AssessmentAuditLog>,
    timeline: Arc<Timeline>,
    // Serializes load-modify-save so two submits for one session cannot interleave
    write_guard: Mutex<()>,
}

impl OnboardingService {
    pub fn new(
        store: Arc<dyn OnboardingStore>,
        audit_log: Arc<AssessmentAuditLog>,
        timeline: Arc<Timeline>,
    ) -> Self {
        Self {
            store,
            audit_log,
            timeline,
            write_guard: Mutex::new(()),
        }
    }

    /// Service backed entirely by in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryOnboardingStore::new()),
            Arc::new(AssessmentAuditLog::new()),
            Arc::new(Timeline::new()),
        )
    }

    pub fn audit_log(&self) -> &AssessmentAuditLog {
        &self.audit_log
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub async fn start(&self, family_id: Uuid, basic_info: BasicInfo) -> Result<OnboardingState> {
        let state = OnboardingState::start(family_id, basic_info, Utc::now())?;
        self.store.save(&state).await?;

        self.timeline
            .record(
                family_id,
                TimelineEventKind::OnboardingStarted {
                    onboarding_id: state.onboarding_id,
                },
            )
            .await?;

        info!(
            onboarding_id = %state.onboarding_id,
            family_id = %family_id,
            "Onboarding started"
        );

        Ok(state)
    }

    pub async fn get(&self, onboarding_id: Uuid) -> Result<OnboardingState> {
        self.store
            .load(onboarding_id)
            .await?
            .ok_or_else(|| AdvisoryError::NotFound(format!("onboarding {}", onboarding_id)))
    }

    pub async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<OnboardingState>> {
        self.store.list_for_family(family_id).await
    }

    pub async fn submit_pre_profiler(
        &self,
        onboarding_id: Uuid,
        answers: PreProfilerAnswers,
    ) -> Result<OnboardingState> {
        let _guard = self.write_guard.lock().await;
        let mut state = self.get(onboarding_id).await?;

        let results: PreProfilerResults = state
            .submit_pre_profiler(answers.clone(), Utc::now())
            .map_err(|e| log_rejection(onboarding_id, "pre_profiler", e))?
            .clone();

        self.store.save(&state).await?;

        let record = AssessmentRecord::new(
            state.family_id,
            onboarding_id,
            AssessmentKind::PreProfiler,
            answers,
            &results,
        )?;
        self.audit_log.record(record).await?;

        self.timeline
            .record(
                state.family_id,
                TimelineEventKind::PreProfilerCompleted {
                    onboarding_id,
                    hni_flag: results.hni_flag,
                    investor_type: results.investor_type().map(str::to_string),
                },
            )
            .await?;

        info!(
            onboarding_id = %onboarding_id,
            hni = results.hni_flag,
            investor_type = ?results.investor_type(),
            "Pre-profiler submitted"
        );

        Ok(state)
    }

    pub async fn submit_risk_profile(
        &self,
        onboarding_id: Uuid,
        answers: RiskProfileAnswers,
    ) -> Result<OnboardingState> {
        let _guard = self.write_guard.lock().await;
        let mut state = self.get(onboarding_id).await?;

        let score: RiskScoreResult = state
            .submit_risk_profile(answers.clone(), Utc::now())
            .map_err(|e| log_rejection(onboarding_id, "risk_profile", e))?
            .clone();

        self.store.save(&state).await?;

        let record = AssessmentRecord::new(
            state.family_id,
            onboarding_id,
            AssessmentKind::RiskProfile,
            answers,
            &score,
        )?;
        self.audit_log.record(record).await?;

        self.timeline
            .record(
                state.family_id,
                TimelineEventKind::RiskProfileCompleted {
                    onboarding_id,
                    total_score: score.total_score,
                    category: score.category,
                },
            )
            .await?;

        info!(
            onboarding_id = %onboarding_id,
            total_score = score.total_score,
            category = %score.category,
            "Risk profile submitted"
        );

        Ok(state)
    }

    pub async fn add_family_member(
        &self,
        onboarding_id: Uuid,
        member: OnboardingFamilyMember,
    ) -> Result<OnboardingState> {
        let _guard = self.write_guard.lock().await;
        let mut state = self.get(onboarding_id).await?;

        state
            .add_family_member(member, Utc::now())
            .map_err(|e| log_rejection(onboarding_id, "family_members", e))?;
        self.store.save(&state).await?;

        Ok(state)
    }

    pub async fn complete(&self, onboarding_id: Uuid) -> Result<OnboardingState> {
        let _guard = self.write_guard.lock().await;
        let mut state = self.get(onboarding_id).await?;

        state
            .complete(Utc::now())
            .map_err(|e| log_rejection(onboarding_id, "complete", e))?;
        self.store.save(&state).await?;

        self.timeline
            .record(
                state.family_id,
                TimelineEventKind::OnboardingCompleted {
                    onboarding_id,
                    family_member_count: state.family_members.len(),
                },
            )
            .await?;

        info!(
            onboarding_id = %onboarding_id,
            members = state.family_members.len(),
            "Onboarding completed"
        );

        Ok(state)
    }
}

fn log_rejection(onboarding_id: Uuid, step: &str, error: AdvisoryError) -> AdvisoryError {
    warn!(onboarding_id = %onboarding_id, step, error = %error, "Onboarding step rejected");
    error
}
