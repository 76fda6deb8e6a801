//! Run orchestration and end-of-run reporting.
mod runner;
pub mod summary;

#[cfg(test)]
mod tests;

pub use runner::{RunController, RunOutcome, RunState};
pub use summary::{PercentileReport, print_report};
