//! Questionnaire definitions
//!
//! Typed question banks for the pre-profiler and the risk profile.
//! Banks are validated once on construction so the classifier and the
//! scorer only ever see well-formed definitions.

pub mod defaults;

use crate::error::AdvisoryError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub use defaults::{DEFAULT_PRE_PROFILER_BANK, DEFAULT_RISK_PROFILE_BANK};

/// Question id → chosen option id
pub type AnswerMap = BTreeMap<String, String>;
pub type PreProfilerAnswers = AnswerMap;
pub type RiskProfileAnswers = AnswerMap;

/// Lowest and highest score a risk option may carry
pub const MIN_OPTION_SCORE: u8 = 1;
pub const MAX_OPTION_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    PreProfiler,
    RiskProfile,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Starter,
    Accumulator,
    Consolidator,
    Retiree,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Salaried,
    Business,
    Professional,
    Pension,
}

/// Segmentation hints attached to a pre-profiler option
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_stage: Option<LifeStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_type: Option<IncomeType>,
    #[serde(default, rename = "isHNI", skip_serializing_if = "Option::is_none")]
    pub is_hni: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hybrid_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    /// Present only on scoring options
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub metadata: OptionMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub order: u32,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// A question paired with the option the respondent picked
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAnswer<'a> {
    pub question: &'a Question,
    pub option: &'a QuestionOption,
}

/// Ordered, validated set of questions of one kind
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionBank {
    kind: QuestionKind,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(kind: QuestionKind, mut questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(AdvisoryError::InvalidQuestionnaire(
                "question bank must contain at least one question".to_string(),
            ));
        }

        let mut question_ids = HashSet::with_capacity(questions.len());
        let mut orders = HashSet::with_capacity(questions.len());

        for question in &questions {
            if question.kind != kind {
                return Err(AdvisoryError::InvalidQuestionnaire(format!(
                    "question '{}' has kind {:?}, bank expects {:?}",
                    question.id, question.kind, kind
                )));
            }
            if !question_ids.insert(question.id.as_str()) {
                return Err(AdvisoryError::InvalidQuestionnaire(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
            if !orders.insert(question.order) {
                return Err(AdvisoryError::InvalidQuestionnaire(format!(
                    "duplicate question order {}",
                    question.order
                )));
            }
            if question.options.is_empty() {
                return Err(AdvisoryError::InvalidQuestionnaire(format!(
                    "question '{}' has no options",
                    question.id
                )));
            }

            let mut option_ids = HashSet::with_capacity(question.options.len());
            for option in &question.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(AdvisoryError::InvalidQuestionnaire(format!(
                        "duplicate option id '{}' in question '{}'",
                        option.id, question.id
                    )));
                }
                if let Some(score) = option.score {
                    if !(MIN_OPTION_SCORE..=MAX_OPTION_SCORE).contains(&score) {
                        return Err(AdvisoryError::InvalidQuestionnaire(format!(
                            "option '{}' of question '{}' has score {} outside {}-{}",
                            option.id, question.id, score, MIN_OPTION_SCORE, MAX_OPTION_SCORE
                        )));
                    }
                }
            }
        }

        questions.sort_by_key(|q| q.order);

        Ok(Self { kind, questions })
    }

    /// Build from definitions known to be well-formed (built-in banks)
    pub(crate) fn trusted(kind: QuestionKind, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.order);
        Self { kind, questions }
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Questions in ascending order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Match every answer to its question and option, in question order.
    ///
    /// Fails on answers to questions outside the bank, on option ids the
    /// question does not define, and on any unanswered question.
    pub fn resolve<'a>(&'a self, answers: &AnswerMap) -> Result<Vec<ResolvedAnswer<'a>>> {
        if let Some(unknown) = answers.keys().find(|id| self.question(id).is_none()) {
            return Err(AdvisoryError::UnknownQuestion(unknown.clone()));
        }

        self.questions
            .iter()
            .map(|question| -> Result<ResolvedAnswer<'a>> {
                let option_id = answers
                    .get(&question.id)
                    .ok_or_else(|| AdvisoryError::MissingAnswer(question.id.clone()))?;

                let option = question.option(option_id).ok_or_else(|| {
                    AdvisoryError::UnknownOption {
                        question_id: question.id.clone(),
                        option_id: option_id.clone(),
                    }
                })?;

                Ok(ResolvedAnswer { question, option })
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn small_bank() -> QuestionBank {
        QuestionBank::new(
            QuestionKind::RiskProfile,
            vec![
                scored_question("b", 2, &[Some(1), Some(2)]),
                scored_question("a", 1, &[Some(1), Some(5)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bank_sorts_by_order() {
        let bank = small_bank();
        let ids: Vec<_> = bank.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_bank_rejects_bad_definitions() {
        let dup = QuestionBank::new(
            QuestionKind::RiskProfile,
            vec![
                scored_question("a", 1, &[Some(1)]),
                scored_question("a", 2, &[Some(1)]),
            ],
        );
        assert!(matches!(dup, Err(AdvisoryError::InvalidQuestionnaire(_))));

        let out_of_range = QuestionBank::new(
            QuestionKind::RiskProfile,
            vec![scored_question("a", 1, &[Some(6)])],
        );
        assert!(matches!(
            out_of_range,
            Err(AdvisoryError::InvalidQuestionnaire(_))
        ));

        let wrong_kind = QuestionBank::new(
            QuestionKind::PreProfiler,
            vec![scored_question("a", 1, &[Some(1)])],
        );
        assert!(matches!(
            wrong_kind,
            Err(AdvisoryError::InvalidQuestionnaire(_))
        ));

        assert!(QuestionBank::new(QuestionKind::RiskProfile, vec![]).is_err());
    }

    #[test]
    fn test_resolve_reports_each_failure() {
        let bank = small_bank();

        let missing = bank.resolve(&answers(&[("a", "a_1")]));
        assert!(matches!(missing, Err(AdvisoryError::MissingAnswer(q)) if q == "b"));

        let unknown_question = bank.resolve(&answers(&[("a", "a_1"), ("b", "b_1"), ("z", "z_1")]));
        assert!(matches!(unknown_question, Err(AdvisoryError::UnknownQuestion(q)) if q == "z"));

        let unknown_option = bank.resolve(&answers(&[("a", "a_9"), ("b", "b_1")]));
        assert!(matches!(
            unknown_option,
            Err(AdvisoryError::UnknownOption { ref option_id, .. }) if option_id == "a_9"
        ));

        let resolved = bank.resolve(&answers(&[("b", "b_2"), ("a", "a_2")])).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].question.id, "a");
        assert_eq!(resolved[0].option.score, Some(5));
    }

    #[test]
    fn test_default_banks_are_valid() {
        assert!(QuestionBank::new(QuestionKind::PreProfiler, defaults::pre_profiler_questions()).is_ok());
        assert!(QuestionBank::new(QuestionKind::RiskProfile, defaults::risk_profile_questions()).is_ok());
        assert_eq!(DEFAULT_PRE_PROFILER_BANK.kind(), QuestionKind::PreProfiler);
        assert_eq!(DEFAULT_RISK_PROFILE_BANK.kind(), QuestionKind::RiskProfile);
        assert_eq!(DEFAULT_RISK_PROFILE_BANK.len(), 7);

        for question in DEFAULT_RISK_PROFILE_BANK.questions() {
            assert!(question.options.iter().all(|o| o.score.is_some()));
        }
    }

    #[test]
    fn test_metadata_wire_names() {
        let metadata = OptionMetadata {
            is_hni: Some(true),
            hybrid_tag: Some("legacy_planner".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["isHNI"], true);
        assert_eq!(json["hybridTag"], "legacy_planner");
        assert!(json.get("lifeStage").is_none());
    }
}
