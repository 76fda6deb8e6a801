//! HTTP request execution and the bounded worker pool.
mod client;
mod dispatcher;
mod executor;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::spawn_dispatcher;
pub use executor::{Executor, HttpExecutor};
