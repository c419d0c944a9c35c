//! # Account Repository
//!
//! File-based account storage. Each account lives in its own directory under
//! the base data directory:
//!
//! ```text
//! data/
//! └── {account_dir}/
//!     ├── account.yaml   ← this module manages these files
//!     └── goals.csv
//! ```
//!
//! Accounts are discovered by scanning directories for an `account.yaml`,
//! so the filesystem is the source of truth. Deleting an account removes
//! its whole directory, which is what cascades goal deletion.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::domain::models::account::Account;
use crate::storage::traits::AccountStorage;

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlAccount {
    id: String,
    name: String,
    start_date: Option<String>,
    created_at: String,
}

impl From<&Account> for YamlAccount {
    fn from(account: &Account) -> Self {
        YamlAccount {
            id: account.id.clone(),
            name: account.name.clone(),
            start_date: account.start_date.map(|d| d.to_rfc3339()),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<YamlAccount> for Account {
    type Error = anyhow::Error;

    fn try_from(yaml: YamlAccount) -> Result<Self> {
        let start_date = yaml
            .start_date
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| anyhow::anyhow!("Failed to parse start_date: {}", e))
            })
            .transpose()?;

        Ok(Account {
            id: yaml.id,
            name: yaml.name,
            start_date,
            created_at: DateTime::parse_from_rfc3339(&yaml.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse created_at: {}", e))?
                .with_timezone(&Utc),
        })
    }
}

/// Filesystem-discovery account repository
#[derive(Debug, Clone)]
pub struct AccountRepository {
    connection: CsvConnection,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Generate a safe filesystem fragment from an account name.
    /// Converts "Acme Corp" -> "acme_corp", "Team #1" -> "team_1", etc.
    pub fn generate_safe_directory_name(account_name: &str) -> String {
        let mut result = String::new();
        let mut last_was_underscore = false;

        for c in account_name.chars() {
            if c.is_ascii_alphanumeric() {
                result.push(c.to_ascii_lowercase());
                last_was_underscore = false;
            } else {
                // Whitespace, punctuation and non-ASCII all collapse to a
                // single underscore.
                if !last_was_underscore && !result.is_empty() {
                    result.push('_');
                }
                last_was_underscore = true;
            }
        }

        result.trim_matches('_').to_string()
    }

    /// Directory name for an account: the safe name fragment plus the id's
    /// timestamp, so accounts sharing a name never share a directory. A
    /// name with no usable characters falls back to the id alone.
    pub fn directory_name_for(account: &Account) -> String {
        let safe_name = Self::generate_safe_directory_name(&account.name);
        let id_suffix = account.id.trim_start_matches("account::");
        if safe_name.is_empty() {
            format!("account_{}", id_suffix)
        } else {
            format!("{}_{}", safe_name, id_suffix)
        }
    }

    /// Path to an account's YAML file within its directory
    fn get_account_yaml_path(&self, directory_name: &str) -> PathBuf {
        self.connection
            .get_account_directory(directory_name)
            .join("account.yaml")
    }

    /// Load an account from a specific directory, if one lives there
    fn load_account_from_directory(&self, directory_name: &str) -> Result<Option<Account>> {
        let yaml_path = self.get_account_yaml_path(directory_name);

        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let yaml_account: YamlAccount = serde_yaml::from_str(&yaml_content)?;

        Ok(Some(Account::try_from(yaml_account)?))
    }

    /// Save an account into its directory, atomically
    fn save_account_to_directory(&self, account: &Account, directory_name: &str) -> Result<()> {
        let account_dir = self.connection.get_account_directory(directory_name);
        if !account_dir.exists() {
            fs::create_dir_all(&account_dir)?;
            info!("Created account directory: {:?}", account_dir);
        }

        let yaml_path = self.get_account_yaml_path(directory_name);
        let yaml_content = serde_yaml::to_string(&YamlAccount::from(account))?;

        let temp_path = yaml_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &yaml_path)?;

        debug!("Saved account {} to directory: {}", account.id, directory_name);
        Ok(())
    }

    /// Discover all accounts by scanning directories, keeping the directory
    /// each account was actually loaded from
    fn discover_accounts_with_directories(&self) -> Result<Vec<(String, Account)>> {
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning empty account list");
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();

        for entry in fs::read_dir(base_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let dir_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => {
                    warn!("Skipping directory with invalid name: {:?}", path);
                    continue;
                }
            };

            match self.load_account_from_directory(dir_name) {
                Ok(Some(account)) => accounts.push((dir_name.to_string(), account)),
                Ok(None) => debug!("Directory {} doesn't contain an account", dir_name),
                Err(e) => warn!("Error loading account from directory {}: {}", dir_name, e),
            }
        }

        accounts.sort_by(|a, b| a.1.name.cmp(&b.1.name));

        debug!("Discovered {} accounts", accounts.len());
        Ok(accounts)
    }

    /// Discover all accounts by scanning directories
    fn discover_accounts(&self) -> Result<Vec<Account>> {
        Ok(self
            .discover_accounts_with_directories()?
            .into_iter()
            .map(|(_, account)| account)
            .collect())
    }

    /// Find the directory holding the account with the given id
    pub(super) fn find_directory_by_account_id(&self, account_id: &str) -> Result<Option<String>> {
        Ok(self
            .discover_accounts_with_directories()?
            .into_iter()
            .find(|(_, account)| account.id == account_id)
            .map(|(directory, _)| directory))
    }
}

impl AccountStorage for AccountRepository {
    fn store_account(&self, account: &Account) -> Result<()> {
        self.save_account_to_directory(account, &Self::directory_name_for(account))
    }

    fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let accounts = self.discover_accounts()?;
        Ok(accounts.into_iter().find(|a| a.id == account_id))
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.discover_accounts()
    }

    fn delete_account(&self, account_id: &str) -> Result<()> {
        if let Some(dir_name) = self.find_directory_by_account_id(account_id)? {
            let account_dir = self.connection.get_account_directory(&dir_name);
            if account_dir.exists() {
                // Removing the directory is the cascade: goals.csv dies too.
                fs::remove_dir_all(&account_dir)?;
                info!("Deleted account directory: {:?}", account_dir);
            }
        } else {
            warn!("Attempted to delete a non-existent account: {}", account_id);
        }
        Ok(())
    }

    fn set_start_date(&self, account_id: &str, start_date: Option<DateTime<Utc>>) -> Result<()> {
        let dir_name = self
            .find_directory_by_account_id(account_id)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account_id))?;

        let mut account = self
            .load_account_from_directory(&dir_name)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account_id))?;

        account.start_date = start_date;
        self.save_account_to_directory(&account, &dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (AccountRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (AccountRepository::new(connection), temp_dir)
    }

    fn test_account(id: &str, name: &str) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            start_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_safe_directory_name() {
        assert_eq!(
            AccountRepository::generate_safe_directory_name("Acme Corp"),
            "acme_corp"
        );
        assert_eq!(
            AccountRepository::generate_safe_directory_name("Team #1"),
            "team_1"
        );
        assert_eq!(
            AccountRepository::generate_safe_directory_name("  spaced  out  "),
            "spaced_out"
        );
    }

    #[test]
    fn test_directory_name_includes_id_suffix() {
        assert_eq!(
            AccountRepository::directory_name_for(&test_account("account::42", "Acme Corp")),
            "acme_corp_42"
        );
        assert_eq!(
            AccountRepository::directory_name_for(&test_account("account::42", "###")),
            "account_42"
        );
    }

    #[test]
    fn test_same_name_accounts_get_distinct_directories() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_account(&test_account("account::1", "Acme")).unwrap();
        repo.store_account(&test_account("account::2", "Acme")).unwrap();

        assert_eq!(repo.list_accounts().unwrap().len(), 2);
        assert!(repo.get_account("account::1").unwrap().is_some());
        assert!(repo.get_account("account::2").unwrap().is_some());

        // Each resolves to its own directory.
        let dir_one = repo.find_directory_by_account_id("account::1").unwrap().unwrap();
        let dir_two = repo.find_directory_by_account_id("account::2").unwrap().unwrap();
        assert_ne!(dir_one, dir_two);
    }

    #[test]
    fn test_punctuation_only_name_is_discoverable() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.store_account(&test_account("account::3", "###")).unwrap();

        let accounts = repo.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, "account::3");
        assert_eq!(accounts[0].name, "###");
    }

    #[test]
    fn test_store_and_discover_account() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_account(&test_account("account::123", "Test Account"))
            .expect("Failed to store account");

        let accounts = repo.list_accounts().expect("Failed to list accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, "account::123");
        assert_eq!(accounts[0].name, "Test Account");
        assert!(accounts[0].start_date.is_none());

        let retrieved = repo.get_account("account::123").unwrap();
        assert_eq!(retrieved.unwrap().name, "Test Account");
    }

    #[test]
    fn test_list_accounts_ordered_by_name() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_account(&test_account("account::2", "Zeta")).unwrap();
        repo.store_account(&test_account("account::1", "Alpha")).unwrap();

        let names: Vec<String> = repo
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn test_set_start_date_round_trip() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.store_account(&test_account("account::7", "Acme")).unwrap();

        let start = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        repo.set_start_date("account::7", Some(start)).unwrap();
        assert_eq!(
            repo.get_account("account::7").unwrap().unwrap().start_date,
            Some(start)
        );

        repo.set_start_date("account::7", None).unwrap();
        assert_eq!(
            repo.get_account("account::7").unwrap().unwrap().start_date,
            None
        );
    }

    #[test]
    fn test_set_start_date_on_missing_account_fails() {
        let (repo, _temp_dir) = setup_test_repo();
        assert!(repo.set_start_date("account::nope", None).is_err());
    }

    #[test]
    fn test_delete_account_is_idempotent() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.store_account(&test_account("account::9", "Doomed")).unwrap();

        repo.delete_account("account::9").unwrap();
        assert!(repo.get_account("account::9").unwrap().is_none());

        // Deleting again is a no-op, not an error.
        repo.delete_account("account::9").unwrap();
    }
}
