//! Domain layer: models, timeline arithmetic, and the services that
//! enforce the business rules.
//!
//! Everything here is synchronous and storage-agnostic; persistence
//! arrives through the traits in [`crate::storage::traits`], time through
//! the [`clock::Clock`] trait.

pub mod account_service;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod goal_store;
pub mod models;
pub mod progress;
pub mod timeline;

pub use account_service::AccountContext;
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{JourneyError, JourneyResult, ValidationError};
pub use goal_store::GoalStore;
pub use models::account::Account;
pub use models::goal::Goal;
pub use progress::{OverallProgress, ProgressAggregator, WeekSummary};
pub use timeline::{TimelineSnapshot, WeekDateRange, WeekStatus, JOURNEY_DAYS, JOURNEY_WEEKS};
