//! Request outcomes and the single-owner result accumulator.
mod collector;
mod types;


pub use collector::{ResultCollector, setup_result_collector};
pub use types::{FailureKind, RequestOutcome, ResultSet};
