//! Domain-level command and result types.
//!
//! These structs are the inputs and outputs of the services in the domain
//! layer. A host (GUI, CLI, HTTP layer) maps its own request types onto
//! these before calling into [`AccountContext`].
//!
//! [`AccountContext`]: crate::domain::account_service::AccountContext

pub mod account {
    use chrono::{DateTime, Utc};

    use crate::domain::models::account::Account;

    /// Input for creating a new account.
    #[derive(Debug, Clone)]
    pub struct CreateAccountCommand {
        pub name: String,
    }

    /// Result of creating an account; the new account becomes selected.
    #[derive(Debug, Clone)]
    pub struct CreateAccountResult {
        pub account: Account,
    }

    /// Input for selecting an account by id.
    #[derive(Debug, Clone)]
    pub struct SelectAccountCommand {
        pub account_id: String,
    }

    /// Result of a selection attempt.
    ///
    /// `account` is `None` when nothing could be selected (requested id
    /// missing and no other account exists). `load_error` carries a goal
    /// load failure that was degraded to an empty store.
    #[derive(Debug, Clone)]
    pub struct SelectAccountResult {
        pub account: Option<Account>,
        pub load_error: Option<String>,
    }

    /// Input for deleting an account and everything it owns.
    #[derive(Debug, Clone)]
    pub struct DeleteAccountCommand {
        pub account_id: String,
    }

    /// Result of a delete; `selected` is whatever account is active after
    /// the cascade (the first remaining one, or none).
    #[derive(Debug, Clone)]
    pub struct DeleteAccountResult {
        pub selected: Option<Account>,
    }

    /// Input for setting or clearing the active account's start date.
    #[derive(Debug, Clone)]
    pub struct SetStartDateCommand {
        pub start_date: Option<DateTime<Utc>>,
    }

    /// Result of a start-date change.
    #[derive(Debug, Clone)]
    pub struct SetStartDateResult {
        pub account: Account,
    }
}

pub mod goal {
    use crate::domain::models::goal::Goal;

    /// Input for adding a goal to the active account.
    #[derive(Debug, Clone)]
    pub struct AddGoalCommand {
        pub week: u8,
        pub title: String,
        pub description: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddGoalResult {
        pub goal: Goal,
    }

    /// Input for editing a goal's title and description.
    /// `completed`, `week` and `created_at` are preserved.
    #[derive(Debug, Clone)]
    pub struct UpdateGoalCommand {
        pub goal_id: String,
        pub title: String,
        pub description: String,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateGoalResult {
        pub goal: Goal,
    }

    /// Input for flipping a goal's completion flag.
    #[derive(Debug, Clone)]
    pub struct ToggleGoalCommand {
        pub goal_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct ToggleGoalResult {
        pub goal: Goal,
    }

    /// Input for removing a goal. Removal is idempotent.
    #[derive(Debug, Clone)]
    pub struct RemoveGoalCommand {
        pub goal_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct RemoveGoalResult {
        pub removed: bool,
    }
}
