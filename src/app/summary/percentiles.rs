use std::time::Duration;

use crate::metrics::ResultSet;

/// Reported buckets in per-mille, so 99.9 stays an integer.
pub const PERCENTILE_PERMILLES: [u64; 8] = [500, 600, 700, 800, 900, 950, 990, 999];
const PERMILLE_DIVISOR: u128 = 1_000;
const PERMILLE_PER_PERCENT: u64 = 10;

/// Mean latency of every sample at or above one percentile rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketAverage {
    pub permille: u64,
    pub average: Option<Duration>,
}

impl BucketAverage {
    /// Percentile label as printed: `50`, `95`, `99.9`.
    #[must_use]
    pub fn label(&self) -> String {
        let whole = self.permille.checked_div(PERMILLE_PER_PERCENT).unwrap_or(0);
        let tenths = self.permille.checked_rem(PERMILLE_PER_PERCENT).unwrap_or(0);
        if tenths == 0 {
            whole.to_string()
        } else {
            format!("{}.{}", whole, tenths)
        }
    }
}

/// Final statistics of a run. `None` marks values that are undefined
/// because no sample exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PercentileReport {
    pub count: u64,
    pub failed: u64,
    pub average: Option<Duration>,
    pub buckets: Vec<BucketAverage>,
}

impl PercentileReport {
    /// Sorts the frozen samples and computes the overall and tail averages.
    #[must_use]
    pub fn from_results(results: ResultSet) -> Self {
        let count = results.request_count();
        let failed = results.failed_requests();
        let mut latencies = results.into_latencies();
        if latencies.is_empty() {
            return Self {
                count,
                failed,
                average: None,
                buckets: Vec::new(),
            };
        }

        latencies.sort();
        let buckets = PERCENTILE_PERMILLES
            .iter()
            .map(|&permille| BucketAverage {
                permille,
                average: tail_average(&latencies, permille),
            })
            .collect();

        Self {
            count,
            failed,
            average: average(&latencies),
            buckets,
        }
    }
}

/// `floor(len * permille / 1000)`, the first index of the tail.
pub(crate) fn cutoff_index(len: usize, permille: u64) -> usize {
    let len_u128 = u128::try_from(len).unwrap_or(u128::MAX);
    let cutoff = len_u128
        .saturating_mul(u128::from(permille))
        .checked_div(PERMILLE_DIVISOR)
        .unwrap_or(0);
    usize::try_from(cutoff).map_or(len, |value| value.min(len))
}

/// Average of `sorted[cutoff..]`; `None` when that tail is empty.
pub(crate) fn tail_average(sorted: &[Duration], permille: u64) -> Option<Duration> {
    let cutoff = cutoff_index(sorted.len(), permille);
    sorted.get(cutoff..).and_then(average)
}

pub(crate) fn average(samples: &[Duration]) -> Option<Duration> {
    if samples.is_empty() {
        return None;
    }
    let total_nanos = samples
        .iter()
        .fold(0u128, |acc, sample| acc.saturating_add(sample.as_nanos()));
    let len = u128::try_from(samples.len()).ok()?;
    let mean = total_nanos.checked_div(len)?;
    Some(Duration::from_nanos(
        u64::try_from(mean).unwrap_or(u64::MAX),
    ))
}
