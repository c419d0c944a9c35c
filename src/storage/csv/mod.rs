//! # CSV Storage Module
//!
//! File-based storage implementation: one directory per account holding an
//! `account.yaml` and a `goals.csv`. Demonstrates that the domain layer is
//! storage-agnostic behind the traits in [`crate::storage::traits`].
//!
//! ```text
//! data/
//! └── {account_dir}/
//!     ├── account.yaml
//!     └── goals.csv
//! ```

pub mod account_repository;
pub mod connection;
pub mod goal_repository;

pub use account_repository::AccountRepository;
pub use connection::CsvConnection;
pub use goal_repository::GoalRepository;
