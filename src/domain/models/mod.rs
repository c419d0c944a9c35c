//! Domain models for the journey tracker.

pub mod account;
pub mod goal;
