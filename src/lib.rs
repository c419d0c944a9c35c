//! Core library for an eight-week goal journey tracker.
//!
//! The journey is a fixed 56-day window starting at an account's start
//! date. The domain layer computes which week is current, how far along
//! the journey is, and aggregates per-week goal progress; the storage
//! layer persists accounts and goals as per-account YAML and CSV files.
//!
//! Typical embedding:
//!
//! ```no_run
//! use journey_tracker::domain::commands::account::CreateAccountCommand;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut context = journey_tracker::open("./data")?;
//! context.create_account(CreateAccountCommand {
//!     name: "Acme".to_string(),
//! })?;
//! println!("week {}", context.current_week());
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod storage;

pub use domain::{
    Account, AccountContext, Goal, JourneyError, JourneyResult, OverallProgress, TimelineSnapshot,
    WeekStatus, WeekSummary,
};
pub use storage::csv::CsvConnection;

use std::path::Path;

/// Open (creating if needed) a data directory and return a session over
/// it with the first account auto-selected.
pub fn open<P: AsRef<Path>>(data_dir: P) -> anyhow::Result<AccountContext<CsvConnection>> {
    let connection = CsvConnection::new(data_dir)?;
    let mut context = AccountContext::new(connection);
    context.initialize()?;
    Ok(context)
}
