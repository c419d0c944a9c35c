//! Account selection and the session facade.
//!
//! `AccountContext` is the explicit object that replaces any global "current
//! account" state: it holds the selected account (or none), owns the active
//! [`GoalStore`], and exposes the full query/command surface the
//! presentation layer consumes. Switching accounts re-creates the goal
//! store, which is what keeps one account's goals from ever leaking into
//! another's view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::commands::account::{
    CreateAccountCommand, CreateAccountResult, DeleteAccountCommand, DeleteAccountResult,
    SelectAccountCommand, SelectAccountResult, SetStartDateCommand, SetStartDateResult,
};
use crate::domain::commands::goal::{
    AddGoalCommand, AddGoalResult, RemoveGoalCommand, RemoveGoalResult, ToggleGoalCommand,
    ToggleGoalResult, UpdateGoalCommand, UpdateGoalResult,
};
use crate::domain::errors::{JourneyError, JourneyResult, ValidationError};
use crate::domain::goal_store::GoalStore;
use crate::domain::models::account::Account;
use crate::domain::models::goal::Goal;
use crate::domain::progress::{OverallProgress, ProgressAggregator, WeekSummary};
use crate::domain::timeline::{self, WeekStatus};
use crate::storage::traits::{AccountStorage, Connection};

const MAX_ACCOUNT_NAME_LENGTH: usize = 100;

/// Session facade over one storage connection.
///
/// At most one account is active at a time; goal commands and
/// `set_start_date` require a selection and fail with
/// [`JourneyError::NoAccountSelected`] otherwise.
pub struct AccountContext<C: Connection> {
    connection: C,
    account_repository: C::AccountRepository,
    clock: Arc<dyn Clock>,
    selected: Option<Account>,
    goal_store: Option<GoalStore<C::GoalRepository>>,
}

impl<C: Connection> AccountContext<C> {
    /// Create a context with the wall clock.
    pub fn new(connection: C) -> Self {
        Self::with_clock(connection, Arc::new(SystemClock))
    }

    /// Create a context with an injected clock (tests, explicit recompute).
    pub fn with_clock(connection: C, clock: Arc<dyn Clock>) -> Self {
        let account_repository = connection.create_account_repository();
        Self {
            connection,
            account_repository,
            clock,
            selected: None,
            goal_store: None,
        }
    }

    /// The currently selected account, if any.
    pub fn selected_account(&self) -> Option<&Account> {
        self.selected.as_ref()
    }

    /// All accounts, ordered by name.
    pub fn list_accounts(&self) -> JourneyResult<Vec<Account>> {
        Ok(self.account_repository.list_accounts()?)
    }

    /// Load accounts and auto-select the first one when nothing is selected
    /// yet. A no-op if a selection already exists.
    pub fn initialize(&mut self) -> JourneyResult<SelectAccountResult> {
        if let Some(account) = &self.selected {
            return Ok(SelectAccountResult {
                account: Some(account.clone()),
                load_error: None,
            });
        }

        match self.account_repository.list_accounts()?.into_iter().next() {
            Some(account) => {
                info!("Auto-selecting first account: {}", account.id);
                Ok(self.activate(account))
            }
            None => Ok(SelectAccountResult {
                account: None,
                load_error: None,
            }),
        }
    }

    /// Select an account by id. A missing id falls back to the first
    /// existing account; with no accounts at all the selection clears.
    pub fn select(&mut self, command: SelectAccountCommand) -> JourneyResult<SelectAccountResult> {
        let account = match self.account_repository.get_account(&command.account_id)? {
            Some(account) => Some(account),
            None => {
                warn!(
                    "Account not found: {}, falling back to first available",
                    command.account_id
                );
                self.account_repository.list_accounts()?.into_iter().next()
            }
        };

        match account {
            Some(account) => Ok(self.activate(account)),
            None => {
                debug!("No accounts exist, clearing selection");
                self.selected = None;
                self.goal_store = None;
                Ok(SelectAccountResult {
                    account: None,
                    load_error: None,
                })
            }
        }
    }

    /// Create a new account and select it.
    pub fn create_account(
        &mut self,
        command: CreateAccountCommand,
    ) -> JourneyResult<CreateAccountResult> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyAccountName.into());
        }
        if name.chars().count() > MAX_ACCOUNT_NAME_LENGTH {
            return Err(ValidationError::AccountNameTooLong.into());
        }

        let now = self.clock.now();
        // Ids derive from the creation time; bump the millis when two
        // accounts are created within the same millisecond.
        let existing: Vec<String> = self
            .account_repository
            .list_accounts()?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let mut millis = now.timestamp_millis() as u64;
        let mut id = Account::generate_id(millis);
        while existing.contains(&id) {
            millis += 1;
            id = Account::generate_id(millis);
        }

        let account = Account {
            id,
            name: name.to_string(),
            start_date: None,
            created_at: now,
        };

        self.account_repository.store_account(&account)?;
        info!("Created account {} ({})", account.name, account.id);

        self.activate(account.clone());
        Ok(CreateAccountResult { account })
    }

    /// Delete an account and everything it owns. Idempotent: deleting a
    /// missing id is a no-op. If the deleted account was selected, the
    /// first remaining account takes its place (or none remains selected).
    pub fn delete_account(
        &mut self,
        command: DeleteAccountCommand,
    ) -> JourneyResult<DeleteAccountResult> {
        self.account_repository.delete_account(&command.account_id)?;
        info!("Deleted account {}", command.account_id);

        let was_selected = self
            .selected
            .as_ref()
            .map_or(false, |a| a.id == command.account_id);

        if was_selected {
            self.selected = None;
            self.goal_store = None;
            if let Some(next) = self.account_repository.list_accounts()?.into_iter().next() {
                self.activate(next);
            }
        }

        Ok(DeleteAccountResult {
            selected: self.selected.clone(),
        })
    }

    /// Set or clear the journey start date of the active account. Other
    /// accounts are untouched.
    pub fn set_start_date(
        &mut self,
        command: SetStartDateCommand,
    ) -> JourneyResult<SetStartDateResult> {
        let account = self
            .selected
            .as_mut()
            .ok_or(JourneyError::NoAccountSelected)?;

        // The selection can outlive the on-disk record if another process
        // removed it; surface that as a not-found rather than a raw
        // storage error.
        if self.account_repository.get_account(&account.id)?.is_none() {
            return Err(JourneyError::AccountNotFound(account.id.clone()));
        }

        self.account_repository
            .set_start_date(&account.id, command.start_date)?;
        account.start_date = command.start_date;

        info!(
            "Set start date for {} to {:?}",
            account.id, command.start_date
        );
        Ok(SetStartDateResult {
            account: account.clone(),
        })
    }

    /// Install a loaded goal store, discarding it when the selection has
    /// moved on since the load started. This is the guard that keeps a
    /// slow load for account A from leaking into account B's session.
    pub fn apply_goal_snapshot(&mut self, store: GoalStore<C::GoalRepository>) -> bool {
        match &self.selected {
            Some(account) if account.id == store.account_id() => {
                self.goal_store = Some(store);
                true
            }
            _ => {
                debug!(
                    "Discarding stale goal snapshot for {}",
                    store.account_id()
                );
                false
            }
        }
    }

    /// Select the account and (re)load its goals, degrading to an empty
    /// store when the load fails.
    fn activate(&mut self, account: Account) -> SelectAccountResult {
        self.selected = Some(account.clone());

        let (store, load_error) =
            match GoalStore::load(self.connection.create_goal_repository(), &account.id) {
                Ok(store) => (store, None),
                Err(e) => {
                    warn!("Failed to load goals for {}: {}", account.id, e);
                    (
                        GoalStore::empty(self.connection.create_goal_repository(), &account.id),
                        Some(e.to_string()),
                    )
                }
            };
        self.apply_goal_snapshot(store);

        SelectAccountResult {
            account: Some(account),
            load_error,
        }
    }

    fn goal_store_mut(&mut self) -> JourneyResult<&mut GoalStore<C::GoalRepository>> {
        self.goal_store
            .as_mut()
            .ok_or(JourneyError::NoAccountSelected)
    }

    fn active_goals(&self) -> &[Goal] {
        self.goal_store.as_ref().map_or(&[], |store| store.goals())
    }

    fn start_date(&self) -> Option<DateTime<Utc>> {
        self.selected.as_ref().and_then(|a| a.start_date)
    }

    // --- goal commands, scoped to the active account ---

    pub fn add_goal(&mut self, command: AddGoalCommand) -> JourneyResult<AddGoalResult> {
        let now = self.clock.now();
        self.goal_store_mut()?.add(command, now)
    }

    pub fn update_goal(&mut self, command: UpdateGoalCommand) -> JourneyResult<UpdateGoalResult> {
        self.goal_store_mut()?.update(command)
    }

    pub fn toggle_goal(&mut self, command: ToggleGoalCommand) -> JourneyResult<ToggleGoalResult> {
        self.goal_store_mut()?.toggle_complete(command)
    }

    pub fn remove_goal(&mut self, command: RemoveGoalCommand) -> JourneyResult<RemoveGoalResult> {
        self.goal_store_mut()?.remove(command)
    }

    // --- presentation-layer queries ---

    /// Goals of the active account targeted at a week, insertion order.
    pub fn goals_for_week(&self, week: u8) -> Vec<Goal> {
        self.goal_store
            .as_ref()
            .map(|store| store.goals_for_week(week).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current journey week (1 when no start date is set).
    pub fn current_week(&self) -> u8 {
        timeline::snapshot(self.start_date(), self.clock.now()).current_week
    }

    /// Temporal status of a week for the active account.
    pub fn week_status(&self, week: u8) -> WeekStatus {
        timeline::week_status(self.start_date(), self.clock.now(), week)
    }

    /// Counts plus temporal state for one week.
    pub fn week_summary(&self, week: u8) -> WeekSummary {
        ProgressAggregator::new(self.active_goals(), self.start_date(), self.clock.now())
            .week_summary(week)
    }

    /// Whole-journey statistics for the active account.
    pub fn overall_progress(&self) -> OverallProgress {
        ProgressAggregator::new(self.active_goals(), self.start_date(), self.clock.now()).overall()
    }
}
