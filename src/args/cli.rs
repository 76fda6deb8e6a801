use clap::Parser;
use std::time::Duration;
use url::Url;

use super::parsers::{parse_duration_arg, parse_header, parse_positive_usize, parse_url};
use super::types::{OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "simple-http-st",
    version,
    about = "Simple HTTP stress tester - keeps a fixed number of GET requests in flight for a set duration and reports tail-latency averages."
)]
pub struct TesterArgs {
    /// Target URL for the stress test
    #[arg(value_name = "URL", value_parser = parse_url)]
    pub url: Option<Url>,

    /// Number of parallel workers (requests kept in flight)
    #[arg(
        long = "goroutine-count",
        short = 'g',
        visible_alias = "concurrency",
        default_value = "1",
        value_parser = parse_positive_usize
    )]
    pub goroutine_count: PositiveUsize,

    /// Test duration (e.g. 30s, 2m, 1m30s)
    #[arg(
        long = "duration",
        short = 'd',
        default_value = "1m",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// HTTP headers in 'Name: Value' format (repeatable)
    #[arg(long = "headers", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Per-request timeout (supports ns/us/ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ns/us/ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// How long to wait for in-flight requests after the deadline before abandoning them
    #[arg(long = "grace", default_value = "1s", value_parser = parse_duration_arg)]
    pub drain_grace: Duration,

    /// Report format
    #[arg(long = "format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Path to a TOML or JSON config file
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by SIMPLE_HTTP_ST_LOG/RUST_LOG)
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}
