mod lines;
mod percentiles;


use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use crate::args::OutputFormat;
use crate::error::AppResult;

pub(crate) use lines::report_lines;
pub use percentiles::{BucketAverage, PERCENTILE_PERMILLES, PercentileReport};

#[derive(Debug, Serialize)]
struct JsonReport {
    request_count: u64,
    failed_requests: u64,
    avg_latency_us: Option<u64>,
    percentiles: Vec<JsonBucket>,
}

#[derive(Debug, Serialize)]
struct JsonBucket {
    percentile: String,
    avg_latency_us: Option<u64>,
}

impl From<&PercentileReport> for JsonReport {
    fn from(report: &PercentileReport) -> Self {
        Self {
            request_count: report.count,
            failed_requests: report.failed,
            avg_latency_us: report.average.map(duration_us),
            percentiles: report
                .buckets
                .iter()
                .map(|bucket| JsonBucket {
                    percentile: bucket.label(),
                    avg_latency_us: bucket.average.map(duration_us),
                })
                .collect(),
        }
    }
}

fn duration_us(value: Duration) -> u64 {
    u64::try_from(value.as_micros()).unwrap_or(u64::MAX)
}

/// Writes the final report to stdout.
///
/// # Errors
///
/// Returns an error when stdout cannot be written or JSON encoding fails.
pub fn print_report(report: &PercentileReport, format: OutputFormat) -> AppResult<()> {
    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            for line in report_lines(report) {
                writeln!(stdout, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonReport::from(report))?;
            writeln!(stdout, "{}", json)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
fn json_report(report: &PercentileReport) -> AppResult<serde_json::Value> {
    Ok(serde_json::to_value(JsonReport::from(report))?)
}
