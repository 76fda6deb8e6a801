use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, RunError, ValidationError};
use crate::http::test_support::{run_async_test, spawn_mock_server, test_config};
use crate::http::{Executor, HttpExecutor};
use crate::metrics::RequestOutcome;

struct SleepExecutor {
    delay: Duration,
}

#[async_trait]
impl Executor for SleepExecutor {
    async fn execute(&self) -> RequestOutcome {
        tokio::time::sleep(self.delay).await;
        RequestOutcome::Response {
            status: 200,
            latency: self.delay,
            body_bytes: 0,
        }
    }
}

#[test]
fn second_run_is_rejected() -> AppResult<()> {
    run_async_test(async {
        let config = test_config("http://localhost/", 2, Duration::from_millis(50))?;
        let controller = RunController::new(config);
        let executor = Arc::new(SleepExecutor {
            delay: Duration::from_millis(5),
        });

        if controller.state() != RunState::Idle {
            return Err(AppError::validation("New controller must be idle"));
        }
        let outcome = controller.run(Arc::clone(&executor)).await?;
        if controller.state() != RunState::Finished || outcome.results.request_count() == 0 {
            return Err(AppError::validation(format!(
                "Unexpected first run: {:?} / {}",
                controller.state(),
                outcome.results.request_count()
            )));
        }

        match controller.run(executor).await {
            Err(AppError::Run(RunError::AlreadyStarted)) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected AlreadyStarted, got {:?}",
                other.map(|outcome| outcome.launched)
            ))),
        }
    })
}

#[test]
fn run_ends_close_to_duration() -> AppResult<()> {
    run_async_test(async {
        let server = spawn_mock_server(Duration::from_millis(10), 200).await?;
        let duration = Duration::from_millis(300);
        let config = test_config(&server.url, 4, duration)?;
        let executor = Arc::new(HttpExecutor::new(&config)?);
        let outcome = RunController::new(config).run(executor).await?;

        let upper = duration.saturating_add(Duration::from_millis(800));
        if outcome.elapsed < duration || outcome.elapsed > upper {
            return Err(AppError::validation(format!(
                "Run took {:?} for a {:?} duration",
                outcome.elapsed, duration
            )));
        }
        if outcome.abandoned {
            return Err(AppError::validation("Fast requests must drain within the grace"));
        }
        Ok(())
    })
}

#[test]
fn request_count_matches_samples_under_high_concurrency() -> AppResult<()> {
    run_async_test(async {
        let server = spawn_mock_server(Duration::ZERO, 200).await?;
        let config = test_config(&server.url, 100, Duration::from_millis(300))?;
        let executor = Arc::new(HttpExecutor::new(&config)?);
        let outcome = RunController::new(config).run(executor).await?;

        let count = outcome.results.request_count();
        let samples = u64::try_from(outcome.results.latencies().len()).unwrap_or(u64::MAX);
        if count == 0 || count != samples {
            return Err(AppError::validation(format!(
                "request_count {} vs {} samples",
                count, samples
            )));
        }
        let recorded = count.saturating_add(outcome.results.failed_requests());
        if recorded != outcome.launched {
            return Err(AppError::validation(format!(
                "Launched {} but recorded {}",
                outcome.launched, recorded
            )));
        }
        Ok(())
    })
}

#[test]
fn fixed_latency_server_yields_expected_throughput() -> AppResult<()> {
    run_async_test(async {
        let latency = Duration::from_millis(50);
        let server = spawn_mock_server(latency, 200).await?;
        let config = test_config(&server.url, 5, Duration::from_millis(500))?;
        let executor = Arc::new(HttpExecutor::new(&config)?);
        let outcome = RunController::new(config).run(executor).await?;

        // (500ms / 50ms) * 5 workers, plus one final batch finishing in the grace.
        let count = outcome.results.request_count();
        if !(30..=60).contains(&count) {
            return Err(AppError::validation(format!(
                "Expected about 50 requests, got {}",
                count
            )));
        }

        let report = PercentileReport::from_results(outcome.results);
        let upper = Duration::from_millis(250);
        let averages = report
            .buckets
            .iter()
            .map(|bucket| bucket.average)
            .chain(std::iter::once(report.average));
        for average in averages {
            match average {
                Some(value) if value >= latency && value <= upper => {}
                other => {
                    return Err(AppError::validation(format!(
                        "Average {:?} not close to {:?}",
                        other, latency
                    )));
                }
            }
        }
        Ok(())
    })
}

#[test]
fn stuck_requests_are_abandoned_after_grace() -> AppResult<()> {
    run_async_test(async {
        let mut config = test_config("http://localhost/", 3, Duration::from_millis(50))?;
        config.drain_grace = Duration::from_millis(50);
        let executor = Arc::new(SleepExecutor {
            delay: Duration::from_secs(30),
        });
        let outcome = RunController::new(config).run(executor).await?;

        if !outcome.abandoned || outcome.results.request_count() != 0 || outcome.launched != 3 {
            return Err(AppError::validation(format!(
                "Expected 3 abandoned requests, got abandoned={} count={} launched={}",
                outcome.abandoned,
                outcome.results.request_count(),
                outcome.launched
            )));
        }
        if outcome.elapsed > Duration::from_secs(2) {
            return Err(AppError::validation(format!(
                "Abandoning took {:?}",
                outcome.elapsed
            )));
        }
        Ok(())
    })
}

#[test]
fn oversized_concurrency_is_rejected_before_start() -> AppResult<()> {
    let Ok(too_many) = usize::try_from(u64::from(u32::MAX).saturating_add(1)) else {
        return Ok(());
    };
    run_async_test(async move {
        let mut config = test_config("http://localhost/", 1, Duration::from_millis(50))?;
        config.concurrency = PositiveUsize::try_from(too_many)?;
        let controller = RunController::new(config);
        let executor = Arc::new(SleepExecutor {
            delay: Duration::from_millis(5),
        });

        for _ in 0..2 {
            match controller.run(Arc::clone(&executor)).await {
                Err(AppError::Validation(ValidationError::ConcurrencyTooLarge { .. })) => {}
                other => {
                    return Err(AppError::validation(format!(
                        "Expected ConcurrencyTooLarge, got {:?}",
                        other.map(|outcome| outcome.launched)
                    )));
                }
            }
        }
        if controller.state() != RunState::Idle {
            return Err(AppError::validation(format!(
                "Rejected run must leave the controller idle, got {:?}",
                controller.state()
            )));
        }
        Ok(())
    })
}

#[test]
fn failed_run_still_finishes() -> AppResult<()> {
    run_async_test(async {
        let config = test_config("http://localhost/", 2, Duration::MAX)?;
        let controller = RunController::new(config);
        let executor = Arc::new(SleepExecutor {
            delay: Duration::from_millis(5),
        });

        match controller.run(Arc::clone(&executor)).await {
            Err(AppError::Validation(ValidationError::DurationOverflow)) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected DurationOverflow, got {:?}",
                    other.map(|outcome| outcome.launched)
                )));
            }
        }
        if controller.state() != RunState::Finished {
            return Err(AppError::validation(format!(
                "Failed run must end Finished, got {:?}",
                controller.state()
            )));
        }
        match controller.run(executor).await {
            Err(AppError::Run(RunError::AlreadyStarted)) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected AlreadyStarted, got {:?}",
                other.map(|outcome| outcome.launched)
            ))),
        }
    })
}
