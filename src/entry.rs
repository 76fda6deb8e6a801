use std::ffi::OsString;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::info;

use crate::app::{PercentileReport, RunController, print_report};
use crate::args::{OutputFormat, TesterArgs};
use crate::config::{RunConfig, apply_config, has_default_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::HttpExecutor;
use crate::logger::init_logging;

/// Runs the command line tool to completion.
///
/// Every configuration problem surfaces here before the first request is
/// sent.
///
/// # Errors
///
/// Returns an error for invalid arguments or config files, when the HTTP
/// client cannot be built, or when the run itself fails.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose);
    let config = RunConfig::from_args(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(config, args.output_format))
}

/// An invocation without arguments and without a default config file has no
/// target, so usage goes to stderr and the run fails.
fn parse_args() -> AppResult<(TesterArgs, ArgMatches)> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        eprintln!("{}", cmd.render_help());
        return Err(AppError::validation(ValidationError::MissingUrl));
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok((args, matches))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

async fn run_async(config: RunConfig, format: OutputFormat) -> AppResult<()> {
    let executor = Arc::new(HttpExecutor::new(&config)?);
    let outcome = RunController::new(config).run(executor).await?;

    let results = &outcome.results;
    info!(
        "Received {} body bytes across {} responses.",
        results.body_bytes(),
        results.request_count()
    );
    if results.failed_requests() > 0 || results.non_success_responses() > 0 {
        info!(
            "{} requests failed ({} timed out); {} responses had a non-2xx status.",
            results.failed_requests(),
            results.timed_out_requests(),
            results.non_success_responses()
        );
    }

    let report = PercentileReport::from_results(outcome.results);
    print_report(&report, format)
}
