// ⚠️ Savings Errors - every failure a user can trigger
// All variants are recoverable: the caller shows the message and carries on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SavingsError {
    /// Non-numeric, non-positive, or fractional where a whole number is required
    #[error("enter a valid amount (got {input:?})")]
    InvalidAmount { input: String },

    #[error("no goals yet, add a goal first")]
    EmptyGoalList,

    #[error("already saved today")]
    DuplicateSaveToday,

    #[error("{field} cannot be empty")]
    MissingRequiredField { field: &'static str },

    #[error("goal {id} not found")]
    GoalNotFound { id: String },

    /// Other goals would have to go negative to fund this edit
    #[error("amount {requested} exceeds total savings of {available}")]
    ExceedsTotalSavings { requested: u64, available: u64 },

    /// Persistence failed; in-memory state was left as it was
    #[error("storage error: {0}")]
    Storage(String),
}

impl SavingsError {
    pub fn invalid_amount(input: impl Into<String>) -> Self {
        SavingsError::InvalidAmount {
            input: input.into(),
        }
    }

    /// Stable machine-readable code (used by the API envelope)
    pub fn code(&self) -> &'static str {
        match self {
            SavingsError::InvalidAmount { .. } => "invalid_amount",
            SavingsError::EmptyGoalList => "empty_goal_list",
            SavingsError::DuplicateSaveToday => "duplicate_save_today",
            SavingsError::MissingRequiredField { .. } => "missing_required_field",
            SavingsError::GoalNotFound { .. } => "goal_not_found",
            SavingsError::ExceedsTotalSavings { .. } => "exceeds_total_savings",
            SavingsError::Storage(_) => "storage",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, SavingsError::Storage(_))
    }
}

impl From<anyhow::Error> for SavingsError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain on one line
        SavingsError::Storage(format!("{:#}", err))
    }
}
