//! Configuration loading, merging and the validated run configuration.
mod apply;
mod loader;
mod run;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use run::{MAX_CONCURRENCY, RunConfig};

pub(crate) use loader::has_default_config;

#[cfg(test)]
pub(crate) use loader::load_config_file;
