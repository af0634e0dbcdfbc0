//! Onboarding session state machine
//!
//! pre_profiler → risk_profile → family_members → completed
//!
//! Steps only move forward. Each submit validates its input before any
//! field is touched, so a rejected step leaves the session unchanged.

use crate::classifier::{PreProfilerClassifier, PreProfilerResults};
use crate::error::AdvisoryError;
use crate::models::{BasicInfo, OnboardingFamilyMember};
use crate::questionnaire::{PreProfilerAnswers, RiskProfileAnswers};
use crate::risk::{RiskScoreResult, RiskScorer};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    PreProfiler,
    RiskProfile,
    FamilyMembers,
    Completed,
}

impl OnboardingStatus {
    pub fn next(&self) -> Option<OnboardingStatus> {
        match self {
            OnboardingStatus::PreProfiler => Some(OnboardingStatus::RiskProfile),
            OnboardingStatus::RiskProfile => Some(OnboardingStatus::FamilyMembers),
            OnboardingStatus::FamilyMembers => Some(OnboardingStatus::Completed),
            OnboardingStatus::Completed => None,
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OnboardingStatus::PreProfiler => "pre_profiler",
            OnboardingStatus::RiskProfile => "risk_profile",
            OnboardingStatus::FamilyMembers => "family_members",
            OnboardingStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    pub onboarding_id: Uuid,
    pub family_id: Uuid,
    pub basic_info: BasicInfo,
    pub pre_profiler_answers: PreProfilerAnswers,
    pub pre_profiler_results: Option<PreProfilerResults>,
    pub risk_profile_answers: RiskProfileAnswers,
    pub risk_score: Option<RiskScoreResult>,
    pub family_members: Vec<OnboardingFamilyMember>,
    pub status: OnboardingStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OnboardingState {
    pub fn start(family_id: Uuid, basic_info: BasicInfo, now: DateTime<Utc>) -> Result<Self> {
        if basic_info.full_name.trim().is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "full name is required".to_string(),
            ));
        }
        if !basic_info.email.contains('@') {
            return Err(AdvisoryError::InvalidInput(format!(
                "'{}' is not an email address",
                basic_info.email
            )));
        }

        Ok(Self {
            onboarding_id: Uuid::new_v4(),
            family_id,
            basic_info,
            pre_profiler_answers: PreProfilerAnswers::new(),
            pre_profiler_results: None,
            risk_profile_answers: RiskProfileAnswers::new(),
            risk_score: None,
            family_members: Vec::new(),
            status: OnboardingStatus::PreProfiler,
            started_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == OnboardingStatus::Completed
    }

    fn require(&self, expected: OnboardingStatus, action: &str) -> Result<()> {
        if self.status != expected {
            return Err(AdvisoryError::InvalidTransition(format!(
                "cannot {} while onboarding is at {}",
                action, self.status
            )));
        }
        Ok(())
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        if let Some(next) = self.status.next() {
            self.status = next;
        }
        self.updated_at = now;
    }

    pub fn submit_pre_profiler(
        &mut self,
        answers: PreProfilerAnswers,
        now: DateTime<Utc>,
    ) -> Result<&PreProfilerResults> {
        self.require(OnboardingStatus::PreProfiler, "submit the pre-profiler")?;

        let results = PreProfilerClassifier::classify(&answers)?;

        self.pre_profiler_answers = answers;
        self.advance(now);
        Ok(&*self.pre_profiler_results.insert(results))
    }

    pub fn submit_risk_profile(
        &mut self,
        answers: RiskProfileAnswers,
        now: DateTime<Utc>,
    ) -> Result<&RiskScoreResult> {
        self.require(OnboardingStatus::RiskProfile, "submit the risk profile")?;

        let score = RiskScorer::score(&answers)?;

        self.risk_profile_answers = answers;
        self.advance(now);
        Ok(&*self.risk_score.insert(score))
    }

    pub fn add_family_member(
        &mut self,
        member: OnboardingFamilyMember,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require(OnboardingStatus::FamilyMembers, "add family members")?;

        if member.name.trim().is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "family member name is required".to_string(),
            ));
        }
        if self
            .family_members
            .iter()
            .any(|m| m.member_id == member.member_id)
        {
            return Err(AdvisoryError::InvalidInput(format!(
                "family member {} already added",
                member.member_id
            )));
        }

        self.family_members.push(member);
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(OnboardingStatus::FamilyMembers, "complete onboarding")?;

        self.advance(now);
        self.completed_at = Some(now);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn started() -> OnboardingState {
        OnboardingState::start(Uuid::new_v4(), basic_info(), Utc::now()).unwrap()
    }

    #[test]
    fn test_full_forward_flow() {
        let mut state = started();
        assert_eq!(state.status, OnboardingStatus::PreProfiler);

        let results = state
            .submit_pre_profiler(pre_profiler_answers(), Utc::now())
            .unwrap();
        assert!(results.hni_flag);
        assert_eq!(state.status, OnboardingStatus::RiskProfile);

        // 4 + 3 + 3 + 4 + 4 + 4 + 3
        let score = state.submit_risk_profile(risk_answers(), Utc::now()).unwrap();
        assert_eq!(score.total_score, 25);
        assert_eq!(state.status, OnboardingStatus::FamilyMembers);

        state.add_family_member(member("Rohan Mehta"), Utc::now()).unwrap();
        assert_eq!(state.family_members.len(), 1);

        let finished_at = Utc::now();
        state.complete(finished_at).unwrap();
        assert!(state.is_completed());
        assert_eq!(state.completed_at, Some(finished_at));
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let mut state = started();

        let skipped = state.submit_risk_profile(risk_answers(), Utc::now());
        assert!(matches!(skipped, Err(AdvisoryError::InvalidTransition(_))));

        let early = state.complete(Utc::now());
        assert!(matches!(early, Err(AdvisoryError::InvalidTransition(_))));

        let member_early = state.add_family_member(member("Rohan"), Utc::now());
        assert!(matches!(member_early, Err(AdvisoryError::InvalidTransition(_))));
        assert_eq!(state.status, OnboardingStatus::PreProfiler);
    }

    #[test]
    fn test_steps_cannot_be_repeated() {
        let mut state = started();
        state
            .submit_pre_profiler(pre_profiler_answers(), Utc::now())
            .unwrap();

        let again = state.submit_pre_profiler(pre_profiler_answers(), Utc::now());
        assert!(matches!(again, Err(AdvisoryError::InvalidTransition(_))));
    }

    #[test]
    fn test_invalid_answers_leave_state_unchanged() {
        let mut state = started();
        let mut partial = pre_profiler_answers();
        partial.remove("pp_primary_objective");

        let result = state.submit_pre_profiler(partial, Utc::now());
        assert!(matches!(result, Err(AdvisoryError::MissingAnswer(_))));
        assert_eq!(state.status, OnboardingStatus::PreProfiler);
        assert!(state.pre_profiler_answers.is_empty());
        assert!(state.pre_profiler_results.is_none());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut state = started();
        state.submit_pre_profiler(pre_profiler_answers(), Utc::now()).unwrap();
        state.submit_risk_profile(risk_answers(), Utc::now()).unwrap();
        state.complete(Utc::now()).unwrap();

        assert_eq!(state.status.next(), None);
        assert!(state.complete(Utc::now()).is_err());
        assert!(state.add_family_member(member("Late"), Utc::now()).is_err());
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let mut state = started();
        state.submit_pre_profiler(pre_profiler_answers(), Utc::now()).unwrap();
        state.submit_risk_profile(risk_answers(), Utc::now()).unwrap();

        let spouse = member("Rohan");
        state.add_family_member(spouse.clone(), Utc::now()).unwrap();
        assert!(state.add_family_member(spouse, Utc::now()).is_err());
    }

    #[test]
    fn test_start_validates_basic_info() {
        let mut info = basic_info();
        info.email = "not-an-email".to_string();
        assert!(OnboardingState::start(Uuid::new_v4(), info, Utc::now()).is_err());

        let mut info = basic_info();
        info.full_name = "  ".to_string();
        assert!(OnboardingState::start(Uuid::new_v4(), info, Utc::now()).is_err());
    }
}
