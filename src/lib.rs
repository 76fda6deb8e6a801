//! Core library for the `simple-http-st` CLI.
//!
//! The binary keeps a fixed number of HTTP GET requests in flight against one
//! URL for a set duration, then prints the average latency of each upper
//! percentile tail. This crate holds the building blocks: argument and config
//! parsing, the request executor, the bounded worker pool, the run
//! controller and the reporter.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;

mod entry;
mod logger;

pub use entry::run;
