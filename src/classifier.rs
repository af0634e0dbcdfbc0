//! Pre-Profiler Classifier
//!
//! Segments a prospect from the pre-profiler answers:
//! - Life stage and income type
//! - Investor type (hybrid tag)
//! - HNI flag
//!
//! Fields are folded in question order. A later question's metadata
//! replaces an earlier value for the same field; the HNI flag is sticky
//! once any selected option raises it.

use crate::error::AdvisoryError;
use crate::questionnaire::{
    IncomeType, LifeStage, PreProfilerAnswers, QuestionBank, QuestionKind,
    DEFAULT_PRE_PROFILER_BANK,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreProfilerResults {
    pub life_stage: Option<LifeStage>,
    pub income_type: Option<IncomeType>,
    #[serde(alias = "investorType")]
    pub hybrid_tag: Option<String>,
    pub hni_flag: bool,
    pub description: Option<String>,
}

impl PreProfilerResults {
    /// The hybrid tag under the name presentation code uses
    pub fn investor_type(&self) -> Option<&str> {
        self.hybrid_tag.as_deref()
    }
}

/// Pre-profiler classifier
pub struct PreProfilerClassifier;

impl PreProfilerClassifier {
    /// Classify against the built-in pre-profiler bank
    pub fn classify(answers: &PreProfilerAnswers) -> Result<PreProfilerResults> {
        Self::classify_with(&DEFAULT_PRE_PROFILER_BANK, answers)
    }

    /// Classify against a caller-supplied bank
    pub fn classify_with(
        bank: &QuestionBank,
        answers: &PreProfilerAnswers,
    ) -> Result<PreProfilerResults> {
        if bank.kind() != QuestionKind::PreProfiler {
            return Err(AdvisoryError::InvalidQuestionnaire(
                "pre-profiler classification requires a pre-profiler bank".to_string(),
            ));
        }

        let resolved = bank.resolve(answers)?;

        let results = resolved
            .iter()
            .fold(PreProfilerResults::default(), |mut acc, answer| {
                let meta = &answer.option.metadata;

                if let Some(stage) = meta.life_stage {
                    acc.life_stage = Some(stage);
                }
                if let Some(income) = meta.income_type {
                    acc.income_type = Some(income);
                }
                if let Some(tag) = &meta.hybrid_tag {
                    acc.hybrid_tag = Some(tag.clone());
                }
                if let Some(description) = &meta.description {
                    acc.description = Some(description.clone());
                }
                acc.hni_flag |= meta.is_hni.unwrap_or(false);

                acc
            });

        debug!(
            life_stage = ?results.life_stage,
            income_type = ?results.income_type,
            hni = results.hni_flag,
            "Pre-profiler classified"
        );

        Ok(results)
    }
}
