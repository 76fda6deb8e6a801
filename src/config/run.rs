use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::args::{PositiveUsize, TesterArgs};
use crate::error::{AppError, AppResult, ValidationError};

/// Upper bound on admission slots; keeps permit counts within what a
/// semaphore can hand out in one batch.
pub const MAX_CONCURRENCY: usize = 1_000_000;

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target_url: Url,
    pub headers: BTreeMap<String, String>,
    pub concurrency: PositiveUsize,
    pub duration: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub drain_grace: Duration,
}

impl RunConfig {
    /// Builds the run configuration from merged CLI/config-file arguments.
    ///
    /// Repeated header names keep the last value.
    ///
    /// # Errors
    ///
    /// Returns an error when no URL was provided or the concurrency is above
    /// [`MAX_CONCURRENCY`].
    pub fn from_args(args: &TesterArgs) -> AppResult<Self> {
        let target_url = args
            .url
            .clone()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;

        let concurrency = args.goroutine_count;
        if concurrency.get() > MAX_CONCURRENCY {
            return Err(AppError::validation(ValidationError::ConcurrencyTooLarge {
                value: concurrency.get(),
                max: MAX_CONCURRENCY,
            }));
        }

        let headers = args.headers.iter().cloned().collect();

        Ok(Self {
            target_url,
            headers,
            concurrency,
            duration: args.duration,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            drain_grace: args.drain_grace,
        })
    }
}
