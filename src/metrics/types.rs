use std::time::Duration;

/// Why a request produced no response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Transport,
}

/// What one Request Executor reports back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A response arrived (any status) and its body was drained.
    Response {
        status: u16,
        latency: Duration,
        body_bytes: u64,
    },
    /// No usable response. Counted, never sampled.
    Failure { kind: FailureKind },
}

/// Accumulated results of a run.
///
/// Only the collector task holds one mutably; the run controller receives it
/// by value once the collector is frozen.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
    request_count: u64,
    latencies: Vec<Duration>,
    failed_requests: u64,
    timed_out_requests: u64,
    non_success_responses: u64,
    body_bytes: u64,
}

impl ResultSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_count: 0,
            latencies: Vec::new(),
            failed_requests: 0,
            timed_out_requests: 0,
            non_success_responses: 0,
            body_bytes: 0,
        }
    }

    /// Builds a result set from already-collected latency samples.
    #[must_use]
    pub fn from_latencies(latencies: Vec<Duration>) -> Self {
        Self {
            request_count: u64::try_from(latencies.len()).unwrap_or(u64::MAX),
            latencies,
            ..Self::new()
        }
    }

    /// Records one outcome. A response bumps the request counter and appends
    /// its latency in the same step, so the two never diverge.
    pub fn record(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Response {
                status,
                latency,
                body_bytes,
            } => {
                self.request_count = self.request_count.saturating_add(1);
                self.latencies.push(latency);
                self.body_bytes = self.body_bytes.saturating_add(body_bytes);
                if !is_success_status(status) {
                    self.non_success_responses = self.non_success_responses.saturating_add(1);
                }
            }
            RequestOutcome::Failure { kind } => {
                self.failed_requests = self.failed_requests.saturating_add(1);
                match kind {
                    FailureKind::Timeout => {
                        self.timed_out_requests = self.timed_out_requests.saturating_add(1);
                    }
                    FailureKind::Transport => {}
                }
            }
        }
    }

    #[must_use]
    pub const fn request_count(&self) -> u64 {
        self.request_count
    }

    #[must_use]
    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    #[must_use]
    pub const fn failed_requests(&self) -> u64 {
        self.failed_requests
    }

    #[must_use]
    pub const fn timed_out_requests(&self) -> u64 {
        self.timed_out_requests
    }

    #[must_use]
    pub const fn non_success_responses(&self) -> u64 {
        self.non_success_responses
    }

    /// Response body bytes read across all sampled requests.
    #[must_use]
    pub const fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    #[must_use]
    pub fn into_latencies(self) -> Vec<Duration> {
        self.latencies
    }
}

/// 2xx responses count as successful.
fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}
