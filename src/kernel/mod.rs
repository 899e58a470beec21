//! Headless compare core.

pub mod compare;
pub mod services;

pub use compare::{CompareError, CompareOutcome, CompareSession};
