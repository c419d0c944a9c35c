//! # Storage Traits
//!
//! The persistence collaborator contract consumed by the domain layer.
//! Implementations may back these with flat files, a relational store, or
//! anything else; the domain never sees the difference.
//!
//! All operations are synchronous: the core runs single-threaded with one
//! writer per account per session, so a read immediately following a write
//! observes the write.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::models::account::Account;
use crate::domain::models::goal::Goal;

/// Trait defining the interface for account storage operations
pub trait AccountStorage: Send + Sync {
    /// Store a new account
    fn store_account(&self, account: &Account) -> Result<()>;

    /// Retrieve a specific account by ID
    fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// List all accounts ordered by name
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Delete an account by ID, cascading to its goals and start date.
    /// Deleting a missing account is a no-op.
    fn delete_account(&self, account_id: &str) -> Result<()>;

    /// Set or clear the start date for an account
    fn set_start_date(&self, account_id: &str, start_date: Option<DateTime<Utc>>) -> Result<()>;
}

/// Trait defining the interface for goal storage operations
pub trait GoalStorage: Send + Sync {
    /// Store a new goal
    fn store_goal(&self, goal: &Goal) -> Result<()>;

    /// Retrieve a specific goal by ID within an account
    fn get_goal(&self, account_id: &str, goal_id: &str) -> Result<Option<Goal>>;

    /// List all goals for an account in insertion order
    /// (ascending created_at); empty if the account has none.
    fn list_goals(&self, account_id: &str) -> Result<Vec<Goal>>;

    /// Update an existing goal in place
    fn update_goal(&self, goal: &Goal) -> Result<()>;

    /// Delete a single goal. Deleting a missing goal is a no-op.
    fn delete_goal(&self, account_id: &str, goal_id: &str) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// Abstracts away the concrete backend and provides factory methods for
/// creating repositories, so the domain layer can be wired against any
/// storage implementation.
pub trait Connection: Send + Sync + Clone {
    /// The type of AccountStorage this connection creates
    type AccountRepository: AccountStorage;

    /// The type of GoalStorage this connection creates
    type GoalRepository: GoalStorage;

    /// Create a new account repository for this connection
    fn create_account_repository(&self) -> Self::AccountRepository;

    /// Create a new goal repository for this connection
    fn create_goal_repository(&self) -> Self::GoalRepository;
}
