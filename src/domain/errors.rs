//! Error taxonomy for the journey tracker core.
//!
//! Validation failures are rejected before any persistence call and are
//! never partially applied. Persistence failures carry the underlying
//! storage cause and are scoped to the single operation that raised them;
//! none of these errors is fatal to the host.

use thiserror::Error;

use crate::domain::timeline::JOURNEY_WEEKS;

/// Input validation failures, checked before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("goal title cannot be empty")]
    EmptyTitle,
    #[error("goal title cannot exceed 256 characters")]
    TitleTooLong,
    #[error("week must be between 1 and {JOURNEY_WEEKS}, got {0}")]
    WeekOutOfRange(u8),
    #[error("account name cannot be empty")]
    EmptyAccountName,
    #[error("account name cannot exceed 100 characters")]
    AccountNameTooLong,
}

/// All errors surfaced by domain operations.
#[derive(Debug, Error)]
pub enum JourneyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    /// Goal commands and `set_start_date` require a selected account.
    #[error("no account is selected")]
    NoAccountSelected,

    /// Storage collaborator failure; callers degrade to empty data for
    /// display rather than blocking.
    #[error("persistence error: {0}")]
    Persistence(#[from] anyhow::Error),
}

pub type JourneyResult<T> = std::result::Result<T, JourneyError>;
