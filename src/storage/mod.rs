//! Storage layer: the persistence collaborator traits and the file-based
//! implementation shipped with the crate.

pub mod csv;
pub mod traits;

pub use traits::{AccountStorage, Connection, GoalStorage};
