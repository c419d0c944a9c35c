use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::storage::traits::Connection;

/// CsvConnection manages file paths and ensures data files exist for each
/// account. Every account owns one directory under the base directory.
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the directory path for an account's data
    pub fn get_account_directory(&self, directory_name: &str) -> PathBuf {
        self.base_directory.join(directory_name)
    }

    /// Get the file path for an account's goals
    pub fn get_goals_file_path(&self, directory_name: &str) -> PathBuf {
        self.get_account_directory(directory_name).join("goals.csv")
    }

    /// Ensure the goals CSV file exists with its header for an account
    pub fn ensure_goals_file_exists(&self, directory_name: &str) -> Result<()> {
        let account_dir = self.get_account_directory(directory_name);

        if !account_dir.exists() {
            fs::create_dir_all(&account_dir)?;
        }

        let file_path = self.get_goals_file_path(directory_name);
        if !file_path.exists() {
            let header = "id,account_id,week,title,description,completed,created_at\n";
            fs::write(&file_path, header)?;
        }

        Ok(())
    }
}

impl Connection for CsvConnection {
    type AccountRepository = super::account_repository::AccountRepository;
    type GoalRepository = super::goal_repository::GoalRepository;

    fn create_account_repository(&self) -> Self::AccountRepository {
        super::account_repository::AccountRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> Self::GoalRepository {
        super::goal_repository::GoalRepository::new(self.clone())
    }
}
