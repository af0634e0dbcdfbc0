//! Built-in questionnaire banks

use super::{
    IncomeType, LifeStage, OptionMetadata, Question, QuestionBank, QuestionKind, QuestionOption,
};

lazy_static::lazy_static! {
    pub static ref DEFAULT_PRE_PROFILER_BANK: QuestionBank =
        QuestionBank::trusted(QuestionKind::PreProfiler, pre_profiler_questions());

    pub static ref DEFAULT_RISK_PROFILE_BANK: QuestionBank =
        QuestionBank::trusted(QuestionKind::RiskProfile, risk_profile_questions());
}

fn tagged(id: &str, label: &str, metadata: OptionMetadata) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        label: label.to_string(),
        score: None,
        metadata,
    }
}

fn scored(id: &str, label: &str, score: u8) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        label: label.to_string(),
        score: Some(score),
        metadata: OptionMetadata::default(),
    }
}

fn question(
    kind: QuestionKind,
    id: &str,
    order: u32,
    prompt: &str,
    options: Vec<QuestionOption>,
) -> Question {
    Question {
        id: id.to_string(),
        order,
        kind,
        prompt: prompt.to_string(),
        options,
    }
}

pub(crate) fn pre_profiler_questions() -> Vec<Question> {
    let kind = QuestionKind::PreProfiler;

    vec![
        question(
            kind,
            "pp_age_band",
            1,
            "Which age band do you fall in?",
            vec![
                tagged(
                    "age_under_30",
                    "Under 30",
                    OptionMetadata {
                        life_stage: Some(LifeStage::Starter),
                        description: Some("Early in the wealth-building journey".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "age_30_45",
                    "30 to 45",
                    OptionMetadata {
                        life_stage: Some(LifeStage::Accumulator),
                        description: Some("Building assets alongside family commitments".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "age_45_60",
                    "45 to 60",
                    OptionMetadata {
                        life_stage: Some(LifeStage::Consolidator),
                        description: Some("Consolidating wealth ahead of retirement".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "age_60_plus",
                    "60 and above",
                    OptionMetadata {
                        life_stage: Some(LifeStage::Retiree),
                        description: Some("Drawing income from accumulated wealth".to_string()),
                        ..Default::default()
                    },
                ),
            ],
        ),
        question(
            kind,
            "pp_income_source",
            2,
            "What is your primary source of income?",
            vec![
                tagged(
                    "income_salaried",
                    "Salary",
                    OptionMetadata {
                        income_type: Some(IncomeType::Salaried),
                        ..Default::default()
                    },
                ),
                tagged(
                    "income_business",
                    "Own business",
                    OptionMetadata {
                        income_type: Some(IncomeType::Business),
                        ..Default::default()
                    },
                ),
                tagged(
                    "income_professional",
                    "Professional practice",
                    OptionMetadata {
                        income_type: Some(IncomeType::Professional),
                        ..Default::default()
                    },
                ),
                tagged(
                    "income_pension",
                    "Pension or annuity",
                    OptionMetadata {
                        income_type: Some(IncomeType::Pension),
                        life_stage: Some(LifeStage::Retiree),
                        ..Default::default()
                    },
                ),
            ],
        ),
        question(
            kind,
            "pp_investable_assets",
            3,
            "What are your total investable financial assets?",
            vec![
                tagged("assets_below_50l", "Below 50 lakh", OptionMetadata::default()),
                tagged("assets_50l_5cr", "50 lakh to 5 crore", OptionMetadata::default()),
                tagged(
                    "assets_above_5cr",
                    "Above 5 crore",
                    OptionMetadata {
                        is_hni: Some(true),
                        ..Default::default()
                    },
                ),
            ],
        ),
        question(
            kind,
            "pp_primary_objective",
            4,
            "What best describes your primary objective?",
            vec![
                tagged(
                    "objective_preserve",
                    "Protect what I have",
                    OptionMetadata {
                        hybrid_tag: Some("preserver".to_string()),
                        description: Some("Capital preservation with steady income".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "objective_balance",
                    "Grow steadily without large swings",
                    OptionMetadata {
                        hybrid_tag: Some("balanced_builder".to_string()),
                        description: Some("Balanced growth across asset classes".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "objective_grow",
                    "Maximise long-term growth",
                    OptionMetadata {
                        hybrid_tag: Some("wealth_creator".to_string()),
                        description: Some("Growth-led portfolio with equity tilt".to_string()),
                        ..Default::default()
                    },
                ),
                tagged(
                    "objective_legacy",
                    "Plan for the next generation",
                    OptionMetadata {
                        hybrid_tag: Some("legacy_planner".to_string()),
                        is_hni: Some(true),
                        description: Some("Multi-generational wealth and succession".to_string()),
                        ..Default::default()
                    },
                ),
            ],
        ),
    ]
}

pub(crate) fn risk_profile_questions() -> Vec<Question> {
    let kind = QuestionKind::RiskProfile;

    vec![
        question(
            kind,
            "rp_horizon",
            1,
            "How long do you expect to stay invested?",
            vec![
                scored("horizon_lt_1y", "Less than 1 year", 1),
                scored("horizon_1_3y", "1 to 3 years", 2),
                scored("horizon_3_5y", "3 to 5 years", 3),
                scored("horizon_5_10y", "5 to 10 years", 4),
                scored("horizon_gt_10y", "More than 10 years", 5),
            ],
        ),
        question(
            kind,
            "rp_market_fall",
            2,
            "Your portfolio falls 20% in a month. What do you do?",
            vec![
                scored("fall_sell_all", "Sell everything", 1),
                scored("fall_sell_some", "Sell some to limit losses", 2),
                scored("fall_hold", "Hold and wait", 3),
                scored("fall_buy_some", "Buy a little more", 4),
                scored("fall_buy_more", "Invest significantly more", 5),
            ],
        ),
        question(
            kind,
            "rp_experience",
            3,
            "How would you describe your investing experience?",
            vec![
                scored("exp_none", "None", 1),
                scored("exp_deposits", "Deposits and savings only", 2),
                scored("exp_funds", "Mutual funds", 3),
                scored("exp_equities", "Direct equities", 4),
                scored("exp_derivatives", "Derivatives and alternatives", 5),
            ],
        ),
        question(
            kind,
            "rp_income_stability",
            4,
            "How stable is your income over the next five years?",
            vec![
                scored("stability_very_low", "Very uncertain", 1),
                scored("stability_low", "Somewhat uncertain", 2),
                scored("stability_moderate", "Moderately stable", 3),
                scored("stability_high", "Stable", 4),
                scored("stability_very_high", "Very stable and growing", 5),
            ],
        ),
        question(
            kind,
            "rp_return_expectation",
            5,
            "What annual return do you expect from your investments?",
            vec![
                scored("return_inflation", "Match inflation", 1),
                scored("return_fd_plus", "Slightly above fixed deposits", 2),
                scored("return_8_10", "8% to 10%", 3),
                scored("return_10_14", "10% to 14%", 4),
                scored("return_gt_14", "Above 14%", 5),
            ],
        ),
        question(
            kind,
            "rp_liquidity_need",
            6,
            "How much of this money might you need at short notice?",
            vec![
                scored("liquidity_all", "All of it", 1),
                scored("liquidity_most", "Most of it", 2),
                scored("liquidity_half", "About half", 3),
                scored("liquidity_little", "A small part", 4),
                scored("liquidity_none", "None of it", 5),
            ],
        ),
        question(
            kind,
            "rp_loss_tolerance",
            7,
            "What is the largest one-year loss you could accept?",
            vec![
                scored("loss_none", "No loss", 1),
                scored("loss_5", "Up to 5%", 2),
                scored("loss_10", "Up to 10%", 3),
                scored("loss_20", "Up to 20%", 4),
                scored("loss_gt_20", "More than 20%", 5),
            ],
        ),
    ]
}
