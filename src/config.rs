//! Environment configuration
//!
//! Binaries call `dotenv::dotenv().ok()` first; this module only reads
//! variables. The goal projector is configured only when every goal
//! variable is present, since status thresholds are a product decision.

use crate::error::AdvisoryError;
use crate::projection::{GoalProjector, GoalStatusThresholds, ProjectionAssumptions};
use crate::Result;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8080;

const GOAL_VARS: [&str; 4] = [
    "GOAL_ANNUAL_GROWTH_RATE",
    "GOAL_AT_RISK_GAP_PERCENT",
    "GOAL_BEHIND_GAP_PERCENT",
    "GOAL_AT_RISK_DAYS",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalConfig {
    pub assumptions: ProjectionAssumptions,
    pub thresholds: GoalStatusThresholds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub user_directory_path: Option<PathBuf>,
    pub goals: Option<GoalConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => parse_var("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL").or_else(|| get("POSTGRES_URL"));
        let user_directory_path = get("USER_DIRECTORY_PATH").map(PathBuf::from);

        let goal_values: Vec<Option<String>> = GOAL_VARS.iter().map(|key| get(*key)).collect();
        let goals = match goal_values.as_slice() {
            [Some(rate), Some(at_risk), Some(behind), Some(days)] => Some(GoalConfig {
                assumptions: ProjectionAssumptions::new(parse_var(GOAL_VARS[0], rate)?)?,
                thresholds: GoalStatusThresholds::new(
                    parse_var(GOAL_VARS[1], at_risk)?,
                    parse_var(GOAL_VARS[2], behind)?,
                    parse_var(GOAL_VARS[3], days)?,
                )?,
            }),
            values if values.iter().all(Option::is_none) => None,
            values => {
                let missing: Vec<&str> = GOAL_VARS
                    .iter()
                    .zip(values)
                    .filter(|(_, value)| value.is_none())
                    .map(|(key, _)| *key)
                    .collect();
                return Err(AdvisoryError::ConfigError(format!(
                    "goal projection is partially configured; missing {}",
                    missing.join(", ")
                )));
            }
        };

        Ok(Self {
            port,
            database_url,
            user_directory_path,
            goals,
        })
    }

    pub fn goal_projector(&self) -> Option<GoalProjector> {
        self.goals
            .map(|goals| GoalProjector::new(goals.assumptions, goals.thresholds))
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AdvisoryError::ConfigError(format!("{} has invalid value '{}'", key, raw)))
}
