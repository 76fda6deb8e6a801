use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, TesterArgs, parse_duration_arg, parse_header, parse_url};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Fills every argument that was not given on the command line from the
/// config file.
///
/// # Errors
///
/// Returns an error when a config value fails the same validation the CLI
/// applies.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.as_deref()
    {
        args.url = Some(
            parse_url(url)
                .map_err(|err| AppError::config(ConfigError::InvalidUrl { source: err }))?,
        );
    }

    if !is_cli(matches, "goroutine_count")
        && let Some(value) = config.goroutine_count
    {
        args.goroutine_count = PositiveUsize::try_from(value).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "goroutine_count",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "duration")
        && let Some(value) = config.duration.as_deref()
    {
        args.duration = config_duration(value, "duration")?;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(value) = config.timeout.as_deref()
    {
        args.request_timeout = config_duration(value, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_deref()
    {
        args.connect_timeout = config_duration(value, "connect_timeout")?;
    }

    if !is_cli(matches, "drain_grace")
        && let Some(value) = config.grace.as_deref()
    {
        args.drain_grace = config_duration(value, "grace")?;
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn config_duration(value: &str, field: &'static str) -> AppResult<Duration> {
    parse_duration_arg(value)
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
