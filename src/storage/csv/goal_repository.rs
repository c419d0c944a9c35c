//! # CSV Goal Repository
//!
//! File-based goal storage using one CSV file per account, stored inside
//! the account's data directory as `goals.csv`.
//!
//! ## CSV Format
//!
//! ```csv
//! id,account_id,week,title,description,completed,created_at
//! goal::account::1_1700000000000,account::1,3,"Ship MVP","First cut",false,2024-01-02T10:00:00+00:00
//! ```
//!
//! Creates append to the file; updates and deletes rewrite it through a
//! temp file so the on-disk file is always complete. Rows that fail to
//! parse are skipped with a warning instead of poisoning the whole load.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer, WriterBuilder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::account_repository::AccountRepository;
use super::connection::CsvConnection;
use crate::domain::models::goal::Goal;
use crate::storage::traits::GoalStorage;

const GOALS_HEADER: [&str; 7] = [
    "id",
    "account_id",
    "week",
    "title",
    "description",
    "completed",
    "created_at",
];

/// CSV record structure for goals
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GoalRecord {
    id: String,
    account_id: String,
    week: u8,
    title: String,
    description: String,
    completed: bool,
    created_at: String,
}

impl From<&Goal> for GoalRecord {
    fn from(goal: &Goal) -> Self {
        GoalRecord {
            id: goal.id.clone(),
            account_id: goal.account_id.clone(),
            week: goal.week,
            title: goal.title.clone(),
            description: goal.description.clone(),
            completed: goal.completed,
            created_at: goal.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<GoalRecord> for Goal {
    type Error = anyhow::Error;

    fn try_from(record: GoalRecord) -> Result<Self> {
        Ok(Goal {
            id: record.id,
            account_id: record.account_id,
            week: record.week,
            title: record.title,
            description: record.description,
            completed: record.completed,
            created_at: DateTime::parse_from_rfc3339(&record.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse created_at: {}", e))?
                .with_timezone(&Utc),
        })
    }
}

/// CSV-based goal repository using per-account files
#[derive(Debug, Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
    account_repository: AccountRepository,
}

impl GoalRepository {
    /// Create a new CSV goal repository
    pub fn new(connection: CsvConnection) -> Self {
        let account_repository = AccountRepository::new(connection.clone());
        Self {
            connection,
            account_repository,
        }
    }

    /// Find the directory of the account owning the given account id
    fn find_account_directory(&self, account_id: &str) -> Result<Option<String>> {
        self.account_repository.find_directory_by_account_id(account_id)
    }

    /// Read all goals for an account directory, oldest first
    fn read_goals(&self, account_directory: &str) -> Result<Vec<Goal>> {
        self.connection.ensure_goals_file_exists(account_directory)?;

        let goals_file_path = self.connection.get_goals_file_path(account_directory);
        let file = File::open(&goals_file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut goals = Vec::new();
        for result in csv_reader.deserialize::<GoalRecord>() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to read goal record: {}. Skipping.", e);
                    continue;
                }
            };
            match Goal::try_from(record) {
                Ok(goal) => goals.push(goal),
                Err(e) => warn!("Failed to parse goal record: {}. Skipping.", e),
            }
        }

        // Insertion order: ascending created_at, which for append-only files
        // matches file order even after a rewrite.
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(goals)
    }

    /// Rewrite the whole goals file atomically via a temp file
    fn write_goals(&self, account_directory: &str, goals: &[Goal]) -> Result<()> {
        let goals_file_path = self.connection.get_goals_file_path(account_directory);
        let temp_file_path = goals_file_path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_file_path)?;
            let mut csv_writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(BufWriter::new(temp_file));
            // Write the header ourselves so even an empty file keeps it.
            csv_writer.write_record(GOALS_HEADER)?;
            for goal in goals {
                csv_writer.serialize(GoalRecord::from(goal))?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_file_path, &goals_file_path)?;

        debug!("Wrote {} goals to {:?}", goals.len(), goals_file_path);
        Ok(())
    }

    /// Append a single goal without rewriting the existing rows
    fn append_goal(&self, account_directory: &str, goal: &Goal) -> Result<()> {
        self.connection.ensure_goals_file_exists(account_directory)?;

        let goals_file_path = self.connection.get_goals_file_path(account_directory);
        let file = OpenOptions::new().append(true).open(&goals_file_path)?;

        let mut csv_writer = Writer::from_writer(file);
        // The file already carries its header, so append the bare record
        // rather than serializing (which would emit a second header row).
        csv_writer.write_record(&[
            goal.id.as_str(),
            goal.account_id.as_str(),
            &goal.week.to_string(),
            goal.title.as_str(),
            goal.description.as_str(),
            &goal.completed.to_string(),
            &goal.created_at.to_rfc3339(),
        ])?;
        csv_writer.flush()?;

        debug!("Appended goal {} to {:?}", goal.id, goals_file_path);
        Ok(())
    }
}

impl GoalStorage for GoalRepository {
    fn store_goal(&self, goal: &Goal) -> Result<()> {
        let directory = self
            .find_account_directory(&goal.account_id)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", goal.account_id))?;
        self.append_goal(&directory, goal)
    }

    fn get_goal(&self, account_id: &str, goal_id: &str) -> Result<Option<Goal>> {
        match self.find_account_directory(account_id)? {
            Some(directory) => Ok(self
                .read_goals(&directory)?
                .into_iter()
                .find(|g| g.account_id == account_id && g.id == goal_id)),
            None => Ok(None),
        }
    }

    fn list_goals(&self, account_id: &str) -> Result<Vec<Goal>> {
        match self.find_account_directory(account_id)? {
            // Reads are keyed on the owning account, never just the file.
            Some(directory) => Ok(self
                .read_goals(&directory)?
                .into_iter()
                .filter(|g| g.account_id == account_id)
                .collect()),
            None => {
                debug!("No directory for account {}, returning no goals", account_id);
                Ok(Vec::new())
            }
        }
    }

    fn update_goal(&self, goal: &Goal) -> Result<()> {
        let directory = self
            .find_account_directory(&goal.account_id)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", goal.account_id))?;

        let mut goals = self.read_goals(&directory)?;
        let existing = goals
            .iter_mut()
            .find(|g| g.account_id == goal.account_id && g.id == goal.id)
            .ok_or_else(|| anyhow::anyhow!("Goal not found: {}", goal.id))?;
        *existing = goal.clone();

        self.write_goals(&directory, &goals)
    }

    fn delete_goal(&self, account_id: &str, goal_id: &str) -> Result<()> {
        let directory = match self.find_account_directory(account_id)? {
            Some(directory) => directory,
            None => {
                warn!("Attempted to delete a goal for unknown account: {}", account_id);
                return Ok(());
            }
        };

        let mut goals = self.read_goals(&directory)?;
        let before = goals.len();
        goals.retain(|g| !(g.account_id == account_id && g.id == goal_id));

        if goals.len() == before {
            debug!("Goal {} already absent, nothing to delete", goal_id);
            return Ok(());
        }

        self.write_goals(&directory, &goals)
    }
}
