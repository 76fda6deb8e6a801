use std::time::Duration;

use super::percentiles::PercentileReport;

/// Labels are padded with tabs up to this column.
const LABEL_COLUMN: usize = 32;
const TAB_WIDTH: usize = 8;
/// Nanoseconds per hundredth of a millisecond.
const NS_PER_CENTI_MS: u128 = 10_000;
const CENTI_MS_ROUNDING: u128 = 5_000;
const CENTI_PER_UNIT: u128 = 100;
/// Shown when a statistic has no samples behind it.
const UNDEFINED: &str = "n/a";

pub(crate) fn report_lines(report: &PercentileReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.buckets.len().saturating_add(3));
    lines.push(labeled("Request Count:", &report.count.to_string()));
    if report.failed > 0 {
        lines.push(labeled("Failed Requests:", &report.failed.to_string()));
    }
    lines.push(labeled("Avg:", &latency_value(report.average)));
    for bucket in &report.buckets {
        let label = format!("Avg for {} percentile:", bucket.label());
        lines.push(labeled(&label, &latency_value(bucket.average)));
    }
    lines
}

fn labeled(label: &str, value: &str) -> String {
    let tabs = LABEL_COLUMN
        .saturating_sub(label.len())
        .div_ceil(TAB_WIDTH)
        .max(1);
    format!("{}{}{}", label, "\t".repeat(tabs), value)
}

fn latency_value(latency: Option<Duration>) -> String {
    latency.map_or_else(|| UNDEFINED.to_owned(), |value| format!("{} ms", format_ms(value)))
}

/// Milliseconds with two decimals, rounded half up.
pub(crate) fn format_ms(value: Duration) -> String {
    let hundredths = value
        .as_nanos()
        .saturating_add(CENTI_MS_ROUNDING)
        .checked_div(NS_PER_CENTI_MS)
        .unwrap_or(0);
    let whole = hundredths.checked_div(CENTI_PER_UNIT).unwrap_or(0);
    let fraction = hundredths.checked_rem(CENTI_PER_UNIT).unwrap_or(0);
    format!("{}.{:02}", whole, fraction)
}
