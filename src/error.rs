//! Error types for the wealth CRM advisory core

use thiserror::Error;

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisoryError>;

#[derive(Error, Debug)]
pub enum AdvisoryError {

    // =============================
    // Questionnaire Validation
    // =============================

    #[error("Missing answer for question '{0}'")]
    MissingAnswer(String),

    #[error("Unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("Unknown option '{option_id}' for question '{question_id}'")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    #[error("Option '{option_id}' of question '{question_id}' carries no score")]
    UnscoredOption {
        question_id: String,
        option_id: String,
    },

    #[error("Incomplete answers: expected {expected}, received {received}")]
    IncompleteAnswers { expected: usize, received: usize },

    #[error("Invalid questionnaire: {0}")]
    InvalidQuestionnaire(String),

    // =============================
    // Projection / Workflow
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid assumption: {0}")]
    InvalidAssumption(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Scheduling conflict: {0}")]
    SchedulingConflict(String),

    // =============================
    // Authentication
    // =============================

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Session store error: {0}")]
    SessionStoreError(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    // =============================
    // Infrastructure
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdvisoryError {
    /// True for failures caused by caller input; the caller should re-prompt.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AdvisoryError::MissingAnswer(_)
                | AdvisoryError::UnknownQuestion(_)
                | AdvisoryError::UnknownOption { .. }
                | AdvisoryError::UnscoredOption { .. }
                | AdvisoryError::IncompleteAnswers { .. }
                | AdvisoryError::InvalidInput(_)
                | AdvisoryError::InvalidAmount(_)
                | AdvisoryError::InvalidAssumption(_)
        )
    }
}
