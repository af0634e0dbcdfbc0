//! Risk Scorer
//!
//! Sums the scores of a fixed seven-question risk profile and maps the
//! total onto a category with a suggested equity/debt split.

use crate::error::AdvisoryError;
use crate::questionnaire::{
    QuestionBank, QuestionKind, RiskProfileAnswers, DEFAULT_RISK_PROFILE_BANK, MAX_OPTION_SCORE,
    MIN_OPTION_SCORE,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

pub const RISK_QUESTION_COUNT: usize = 7;

pub const MIN_TOTAL_SCORE: u8 = RISK_QUESTION_COUNT as u8 * MIN_OPTION_SCORE;
pub const MAX_TOTAL_SCORE: u8 = RISK_QUESTION_COUNT as u8 * MAX_OPTION_SCORE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub equity_percent: u8,
    pub debt_percent: u8,
}

/// One row of the score → category table
pub struct RiskBand {
    pub category: RiskCategory,
    pub scores: RangeInclusive<u8>,
    pub allocation: AssetAllocation,
    pub description: &'static str,
}

/// Contiguous bands covering MIN_TOTAL_SCORE..=MAX_TOTAL_SCORE
pub static RISK_BANDS: [RiskBand; 3] = [
    RiskBand {
        category: RiskCategory::Conservative,
        scores: 7..=17,
        allocation: AssetAllocation {
            equity_percent: 30,
            debt_percent: 70,
        },
        description: "Prefers stability of capital over growth; suited to a debt-heavy portfolio.",
    },
    RiskBand {
        category: RiskCategory::Moderate,
        scores: 18..=26,
        allocation: AssetAllocation {
            equity_percent: 60,
            debt_percent: 40,
        },
        description: "Accepts moderate volatility for balanced long-term growth.",
    },
    RiskBand {
        category: RiskCategory::Aggressive,
        scores: 27..=35,
        allocation: AssetAllocation {
            equity_percent: 80,
            debt_percent: 20,
        },
        description: "Seeks maximum growth and can ride out sharp drawdowns.",
    },
];

impl RiskCategory {
    pub fn band(&self) -> &'static RiskBand {
        match self {
            RiskCategory::Conservative => &RISK_BANDS[0],
            RiskCategory::Moderate => &RISK_BANDS[1],
            RiskCategory::Aggressive => &RISK_BANDS[2],
        }
    }

    /// Category for a total score; `None` outside the valid range
    pub fn from_total(total: u8) -> Option<Self> {
        RISK_BANDS
            .iter()
            .find(|band| band.scores.contains(&total))
            .map(|band| band.category)
    }

    pub fn allocation(&self) -> AssetAllocation {
        self.band().allocation
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskCategory::Conservative => "Conservative",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::Aggressive => "Aggressive",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreResult {
    pub total_score: u8,
    pub category: RiskCategory,
    pub allocation: AssetAllocation,
    pub description: String,
}

/// Risk profile scorer
pub struct RiskScorer;

impl RiskScorer {
    /// Score against the built-in risk bank
    pub fn score(answers: &RiskProfileAnswers) -> Result<RiskScoreResult> {
        Self::score_with(&DEFAULT_RISK_PROFILE_BANK, answers)
    }

    /// Score against a caller-supplied seven-question bank
    pub fn score_with(bank: &QuestionBank, answers: &RiskProfileAnswers) -> Result<RiskScoreResult> {
        if bank.kind() != QuestionKind::RiskProfile {
            return Err(AdvisoryError::InvalidQuestionnaire(
                "risk scoring requires a risk-profile bank".to_string(),
            ));
        }
        if bank.len() != RISK_QUESTION_COUNT {
            return Err(AdvisoryError::InvalidQuestionnaire(format!(
                "risk bank must have exactly {} questions, found {}",
                RISK_QUESTION_COUNT,
                bank.len()
            )));
        }
        if answers.len() < RISK_QUESTION_COUNT {
            warn!(
                received = answers.len(),
                "Risk profile submitted with missing answers"
            );
            return Err(AdvisoryError::IncompleteAnswers {
                expected: RISK_QUESTION_COUNT,
                received: answers.len(),
            });
        }

        let resolved = bank.resolve(answers)?;

        let mut total: u8 = 0;
        for answer in &resolved {
            let score = answer.option.score.ok_or_else(|| AdvisoryError::UnscoredOption {
                question_id: answer.question.id.clone(),
                option_id: answer.option.id.clone(),
            })?;
            total += score;
        }

        let category = RiskCategory::from_total(total).ok_or_else(|| {
            AdvisoryError::InvalidQuestionnaire(format!(
                "total score {} outside {}-{}",
                total, MIN_TOTAL_SCORE, MAX_TOTAL_SCORE
            ))
        })?;
        let band = category.band();

        debug!(total_score = total, category = %category, "Risk profile scored");

        Ok(RiskScoreResult {
            total_score: total,
            category,
            allocation: band.allocation,
            description: band.description.to_string(),
        })
    }
}
