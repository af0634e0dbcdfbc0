//! Wealth CRM advisory core
//!
//! Domain logic behind a relationship-manager CRM:
//! - Pre-profiler classification (life stage, income type, HNI flag)
//! - Seven-question risk scoring with equity/debt allocation bands
//! - Goal projection with configurable status thresholds
//! - Client onboarding workflow with an audited assessment trail
//! - Authentication over an injected session store
//! - RM ↔ client messaging, meetings and family timelines
//!
//! ONBOARDING FLOW:
//! PRE_PROFILER → RISK_PROFILE → FAMILY_MEMBERS → COMPLETED

pub mod api;
pub mod audit;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod messaging;
pub mod models;
pub mod onboarding;
pub mod projection;
pub mod questionnaire;
pub mod risk;

pub use error::{AdvisoryError, Result};

// Re-export common types
pub use models::*;
pub use classifier::{PreProfilerClassifier, PreProfilerResults};
pub use risk::{RiskCategory, RiskScoreResult, RiskScorer};
pub use projection::{GoalProjection, GoalProjector, GoalStatusThresholds, ProjectionAssumptions};
pub use onboarding::{OnboardingService, OnboardingState, OnboardingStatus};
