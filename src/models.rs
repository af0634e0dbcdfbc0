//! Core data models for the wealth CRM

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Users =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[serde(alias = "rm")]
    RelationshipManager,
    BackOffice,
    Client,
}

/// A signed-in user as seen by presentation code (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

//
// ================= Onboarding Records =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub city: Option<String>,
    /// Tax identifier (PAN)
    pub pan: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    Child,
    Parent,
    Sibling,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingFamilyMember {
    #[serde(default = "Uuid::new_v4")]
    pub member_id: Uuid,
    pub name: String,
    pub relationship: Relationship,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub is_dependent: bool,
}

//
// ================= Goals =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Retirement,
    Education,
    Home,
    Wedding,
    Wealth,
    Emergency,
    Other,
}

/// Recomputed on every review; not a transition graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    AtRisk,
    Behind,
    Achieved,
}

impl Default for GoalStatus {
    fn default() -> Self {
        GoalStatus::OnTrack
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialGoal {
    pub goal_id: Uuid,
    pub family_id: Uuid,
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: f64,
    pub current_amount: f64,
    pub monthly_contribution: f64,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub progress_percent: f64,
    #[serde(default)]
    pub is_achievable: bool,
    #[serde(default)]
    pub projected_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

//
// ================= Dashboard Metrics =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AumMetrics {
    pub total_aum: f64,
    pub client_count: u32,
    pub net_inflows: f64,
    pub aum_growth_percent: f64,
}

impl AumMetrics {
    pub fn average_aum_per_client(&self) -> f64 {
        if self.client_count == 0 {
            return 0.0;
        }
        self.total_aum / self.client_count as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub absolute_return_percent: f64,
    pub xirr_percent: f64,
    pub benchmark_return_percent: f64,
}

impl PerformanceMetrics {
    /// Excess annualized return over the benchmark
    pub fn alpha(&self) -> f64 {
        self.xirr_percent - self.benchmark_return_percent
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "Admin",
            UserRole::RelationshipManager => "Relationship Manager",
            UserRole::BackOffice => "Back Office",
            UserRole::Client => "Client",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalStatus::OnTrack => "On Track",
            GoalStatus::AtRisk => "At Risk",
            GoalStatus::Behind => "Behind",
            GoalStatus::Achieved => "Achieved",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_rm_alias() {
        let role: UserRole = serde_json::from_str("\"rm\"").unwrap();
        assert_eq!(role, UserRole::RelationshipManager);

        let role: UserRole = serde_json::from_str("\"back_office\"").unwrap();
        assert_eq!(role, UserRole::BackOffice);
    }

    #[test]
    fn test_dashboard_metric_helpers() {
        let aum = AumMetrics {
            total_aum: 1_000_000.0,
            client_count: 4,
            net_inflows: 50_000.0,
            aum_growth_percent: 5.0,
        };
        assert_eq!(aum.average_aum_per_client(), 250_000.0);

        let empty = AumMetrics {
            client_count: 0,
            ..aum
        };
        assert_eq!(empty.average_aum_per_client(), 0.0);

        let perf = PerformanceMetrics {
            absolute_return_percent: 18.0,
            xirr_percent: 12.5,
            benchmark_return_percent: 10.0,
        };
        assert!((perf.alpha() - 2.5).abs() < 1e-9);
    }
}
