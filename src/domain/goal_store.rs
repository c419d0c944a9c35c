//! In-memory goal collection for the active account.
//!
//! A `GoalStore` is loaded for exactly one account and is thrown away when
//! the selection changes; that re-creation is what enforces account
//! isolation at the domain level. Every mutation validates first, then
//! writes through to the persistence collaborator before updating the
//! in-memory sequence, so the next read always observes the write.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::domain::commands::goal::{
    AddGoalCommand, AddGoalResult, RemoveGoalCommand, RemoveGoalResult, ToggleGoalCommand,
    ToggleGoalResult, UpdateGoalCommand, UpdateGoalResult,
};
use crate::domain::errors::{JourneyError, JourneyResult, ValidationError};
use crate::domain::models::goal::Goal;
use crate::storage::traits::GoalStorage;

const MAX_TITLE_LENGTH: usize = 256;

/// Goals of one account, kept in insertion order.
#[derive(Debug)]
pub struct GoalStore<G: GoalStorage> {
    repository: G,
    account_id: String,
    goals: Vec<Goal>,
}

impl<G: GoalStorage> GoalStore<G> {
    /// Load all goals for an account from the persistence collaborator.
    pub fn load(repository: G, account_id: &str) -> JourneyResult<Self> {
        let goals = repository.list_goals(account_id)?;
        debug!("Loaded {} goals for account {}", goals.len(), account_id);
        Ok(Self {
            repository,
            account_id: account_id.to_string(),
            goals,
        })
    }

    /// An empty store for an account whose goals could not be loaded.
    /// Display degrades to "no goals" while the load error is surfaced
    /// separately.
    pub fn empty(repository: G, account_id: &str) -> Self {
        Self {
            repository,
            account_id: account_id.to_string(),
            goals: Vec::new(),
        }
    }

    /// The account this store was loaded for.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// All goals in insertion order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Goals targeted at a given week, insertion order preserved.
    pub fn goals_for_week(&self, week: u8) -> Vec<&Goal> {
        self.goals.iter().filter(|g| g.week == week).collect()
    }

    /// Create a goal: validate, assign id and timestamp, persist, then
    /// append to the in-memory sequence.
    pub fn add(&mut self, command: AddGoalCommand, now: DateTime<Utc>) -> JourneyResult<AddGoalResult> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::TitleTooLong.into());
        }
        if !Goal::is_valid_week(command.week) {
            return Err(ValidationError::WeekOutOfRange(command.week).into());
        }

        // Ids derive from the creation time; bump the millis when two goals
        // land within the same millisecond.
        let mut millis = now.timestamp_millis() as u64;
        let mut id = Goal::generate_id(&self.account_id, millis);
        while self.goals.iter().any(|g| g.id == id) {
            millis += 1;
            id = Goal::generate_id(&self.account_id, millis);
        }

        let goal = Goal {
            id,
            account_id: self.account_id.clone(),
            week: command.week,
            title: title.to_string(),
            description: command.description.trim().to_string(),
            completed: false,
            created_at: now,
        };

        self.repository.store_goal(&goal)?;
        self.goals.push(goal.clone());

        info!("Added goal {} to week {}", goal.id, goal.week);
        Ok(AddGoalResult { goal })
    }

    /// Edit a goal's title and description. `completed`, `week` and
    /// `created_at` are preserved.
    pub fn update(&mut self, command: UpdateGoalCommand) -> JourneyResult<UpdateGoalResult> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::TitleTooLong.into());
        }

        let index = self
            .goals
            .iter()
            .position(|g| g.id == command.goal_id)
            .ok_or_else(|| JourneyError::GoalNotFound(command.goal_id.clone()))?;

        let mut updated = self.goals[index].clone();
        updated.title = title.to_string();
        updated.description = command.description.trim().to_string();

        // Persist first; memory only changes once the write-through landed.
        self.repository.update_goal(&updated)?;
        self.goals[index] = updated.clone();

        info!("Updated goal {}", updated.id);
        Ok(UpdateGoalResult { goal: updated })
    }

    /// Flip a goal's completion flag.
    pub fn toggle_complete(&mut self, command: ToggleGoalCommand) -> JourneyResult<ToggleGoalResult> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == command.goal_id)
            .ok_or_else(|| JourneyError::GoalNotFound(command.goal_id.clone()))?;

        let mut updated = self.goals[index].clone();
        updated.completed = !updated.completed;

        // Persist first; memory only changes once the write-through landed.
        self.repository.update_goal(&updated)?;
        self.goals[index] = updated.clone();

        info!(
            "Toggled goal {} -> completed={}",
            updated.id, updated.completed
        );
        Ok(ToggleGoalResult { goal: updated })
    }

    /// Remove a goal. Removing an absent id is a no-op per the
    /// idempotent-delete policy.
    pub fn remove(&mut self, command: RemoveGoalCommand) -> JourneyResult<RemoveGoalResult> {
        if !self.goals.iter().any(|g| g.id == command.goal_id) {
            debug!("Goal {} already absent, nothing to remove", command.goal_id);
            return Ok(RemoveGoalResult { removed: false });
        }

        self.repository.delete_goal(&self.account_id, &command.goal_id)?;
        self.goals.retain(|g| g.id != command.goal_id);

        info!("Removed goal {}", command.goal_id);
        Ok(RemoveGoalResult { removed: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::account::Account;
    use crate::storage::csv::{AccountRepository, CsvConnection, GoalRepository};
    use crate::storage::traits::{AccountStorage, Connection};
    use anyhow::Result;
    use tempfile::TempDir;

    fn setup_store() -> (GoalStore<GoalRepository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let account = Account {
            id: "account::1".to_string(),
            name: "Test".to_string(),
            start_date: None,
            created_at: Utc::now(),
        };
        AccountRepository::new(connection.clone())
            .store_account(&account)
            .unwrap();
        let store = GoalStore::load(connection.create_goal_repository(), &account.id).unwrap();
        (store, temp_dir)
    }

    fn add_cmd(week: u8, title: &str) -> AddGoalCommand {
        AddGoalCommand {
            week,
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_add_and_reload_round_trip() {
        let (mut store, tmp) = setup_store();
        let now = "2024-01-02T10:00:00Z".parse().unwrap();

        let added = store
            .add(
                AddGoalCommand {
                    week: 3,
                    title: "X".to_string(),
                    description: "Y".to_string(),
                },
                now,
            )
            .unwrap()
            .goal;
        assert_eq!(added.week, 3);
        assert!(!added.completed);

        // A read immediately following the write observes it.
        assert_eq!(store.goals().len(), 1);

        // And so does a fresh load from storage.
        let temp_conn = CsvConnection::new(tmp.path()).unwrap();
        let reloaded =
            GoalStore::load(temp_conn.create_goal_repository(), store.account_id()).unwrap();
        assert_eq!(reloaded.goals().len(), 1);
        assert_eq!(reloaded.goals()[0].title, "X");
        assert_eq!(reloaded.goals()[0].description, "Y");
        assert_eq!(reloaded.goals()[0].week, 3);
        assert!(!reloaded.goals()[0].completed);
    }

    #[test]
    fn test_week_boundaries() {
        let (mut store, _tmp) = setup_store();
        let now = Utc::now();

        let err = store.add(add_cmd(0, "too early"), now).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Validation(ValidationError::WeekOutOfRange(0))
        ));
        let err = store.add(add_cmd(9, "too late"), now).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Validation(ValidationError::WeekOutOfRange(9))
        ));

        assert!(store.add(add_cmd(1, "first week"), now).is_ok());
        assert!(store.add(add_cmd(8, "last week"), now).is_ok());
        assert_eq!(store.goals().len(), 2);
    }

    #[test]
    fn test_title_validation() {
        let (mut store, _tmp) = setup_store();
        let now = Utc::now();

        let err = store.add(add_cmd(1, "   "), now).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Validation(ValidationError::EmptyTitle)
        ));

        let err = store.add(add_cmd(1, &"a".repeat(257)), now).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Validation(ValidationError::TitleTooLong)
        ));

        // Nothing was partially applied.
        assert!(store.goals().is_empty());

        // Titles are stored trimmed.
        let goal = store.add(add_cmd(1, "  padded  "), now).unwrap().goal;
        assert_eq!(goal.title, "padded");
    }

    #[test]
    fn test_toggle_complete_round_trip() {
        let (mut store, _tmp) = setup_store();
        let goal = store.add(add_cmd(2, "toggle me"), Utc::now()).unwrap().goal;

        let toggled = store
            .toggle_complete(ToggleGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap()
            .goal;
        assert!(toggled.completed);

        let toggled = store
            .toggle_complete(ToggleGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap()
            .goal;
        assert!(!toggled.completed);
    }

    #[test]
    fn test_update_preserves_completion_week_and_created_at() {
        let (mut store, _tmp) = setup_store();
        let now = "2024-02-01T00:00:00Z".parse().unwrap();
        let goal = store.add(add_cmd(5, "original"), now).unwrap().goal;
        store
            .toggle_complete(ToggleGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap();

        let updated = store
            .update(UpdateGoalCommand {
                goal_id: goal.id.clone(),
                title: "renamed".to_string(),
                description: "new text".to_string(),
            })
            .unwrap()
            .goal;

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "new text");
        assert!(updated.completed);
        assert_eq!(updated.week, 5);
        assert_eq!(updated.created_at, goal.created_at);
    }

    #[test]
    fn test_update_and_toggle_missing_goal() {
        let (mut store, _tmp) = setup_store();

        let err = store
            .update(UpdateGoalCommand {
                goal_id: "goal::ghost".to_string(),
                title: "x".to_string(),
                description: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, JourneyError::GoalNotFound(_)));

        let err = store
            .toggle_complete(ToggleGoalCommand {
                goal_id: "goal::ghost".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, JourneyError::GoalNotFound(_)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut store, _tmp) = setup_store();
        let goal = store.add(add_cmd(1, "doomed"), Utc::now()).unwrap().goal;

        let result = store
            .remove(RemoveGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap();
        assert!(result.removed);

        let result = store
            .remove(RemoveGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap();
        assert!(!result.removed);
        assert!(store.goals().is_empty());
    }

    #[test]
    fn test_goals_for_week_preserves_insertion_order() {
        let (mut store, _tmp) = setup_store();
        let base: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        store
            .add(add_cmd(2, "first"), base + chrono::Duration::seconds(1))
            .unwrap();
        store
            .add(add_cmd(4, "other week"), base + chrono::Duration::seconds(2))
            .unwrap();
        store
            .add(add_cmd(2, "second"), base + chrono::Duration::seconds(3))
            .unwrap();

        let week_two: Vec<&str> = store
            .goals_for_week(2)
            .iter()
            .map(|g| g.title.as_str())
            .collect();
        assert_eq!(week_two, vec!["first", "second"]);
        assert!(store.goals_for_week(7).is_empty());
    }

    #[test]
    fn test_title_limit_counts_characters_not_bytes() {
        let (mut store, _tmp) = setup_store();
        let now = Utc::now();

        // Multi-byte characters: 256 of them is within the limit.
        let goal = store.add(add_cmd(1, &"é".repeat(256)), now).unwrap().goal;
        assert_eq!(goal.title.chars().count(), 256);

        let err = store.add(add_cmd(1, &"é".repeat(257)), now).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Validation(ValidationError::TitleTooLong)
        ));
    }

    /// Storage stub that accepts creates but rejects in-place updates.
    struct RejectingUpdateStorage;

    impl GoalStorage for RejectingUpdateStorage {
        fn store_goal(&self, _goal: &Goal) -> Result<()> {
            Ok(())
        }
        fn get_goal(&self, _account_id: &str, _goal_id: &str) -> Result<Option<Goal>> {
            Ok(None)
        }
        fn list_goals(&self, _account_id: &str) -> Result<Vec<Goal>> {
            Ok(Vec::new())
        }
        fn update_goal(&self, _goal: &Goal) -> Result<()> {
            anyhow::bail!("read-only filesystem")
        }
        fn delete_goal(&self, _account_id: &str, _goal_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_through_leaves_memory_unchanged() {
        let mut store = GoalStore::load(RejectingUpdateStorage, "account::1").unwrap();
        let goal = store.add(add_cmd(2, "stable"), Utc::now()).unwrap().goal;

        let err = store
            .toggle_complete(ToggleGoalCommand {
                goal_id: goal.id.clone(),
            })
            .unwrap_err();
        assert!(matches!(err, JourneyError::Persistence(_)));
        assert!(!store.goals()[0].completed);

        let err = store
            .update(UpdateGoalCommand {
                goal_id: goal.id.clone(),
                title: "renamed".to_string(),
                description: "changed".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, JourneyError::Persistence(_)));
        assert_eq!(store.goals()[0].title, "stable");
        assert!(store.goals()[0].description.is_empty());
    }

    /// Storage stub whose reads always fail, for the degradation path.
    #[derive(Debug)]
    struct FailingGoalStorage;

    impl GoalStorage for FailingGoalStorage {
        fn store_goal(&self, _goal: &Goal) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
        fn get_goal(&self, _account_id: &str, _goal_id: &str) -> Result<Option<Goal>> {
            anyhow::bail!("disk on fire")
        }
        fn list_goals(&self, _account_id: &str) -> Result<Vec<Goal>> {
            anyhow::bail!("disk on fire")
        }
        fn update_goal(&self, _goal: &Goal) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
        fn delete_goal(&self, _account_id: &str, _goal_id: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn test_load_failure_is_a_persistence_error() {
        let err = GoalStore::load(FailingGoalStorage, "account::1").unwrap_err();
        assert!(matches!(err, JourneyError::Persistence(_)));

        // The degraded store still answers queries.
        let store = GoalStore::empty(FailingGoalStorage, "account::1");
        assert!(store.goals().is_empty());
        assert!(store.goals_for_week(1).is_empty());
    }
}
