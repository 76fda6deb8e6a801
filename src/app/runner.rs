use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{AppError, AppResult, RunError, ValidationError};
use crate::http::{Executor, spawn_dispatcher};
use crate::metrics::{RequestOutcome, ResultSet, setup_result_collector};
use crate::shutdown::{ShutdownSender, shutdown_channel};

/// Lower bound on the outcome channel so short bursts never block executors.
const MIN_OUTCOME_CHANNEL_CAPACITY: usize = 1_024;

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_DRAINING: u8 = 2;
const STATE_FINISHED: u8 = 3;

/// Lifecycle of a [`RunController`]. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Draining,
    Finished,
}

impl RunState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_IDLE => Self::Idle,
            STATE_RUNNING => Self::Running,
            STATE_DRAINING => Self::Draining,
            _ => Self::Finished,
        }
    }
}

/// Everything a finished run hands to the reporter.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: ResultSet,
    /// Requests launched by the dispatcher, including abandoned ones.
    pub launched: u64,
    pub elapsed: Duration,
    /// True when the drain grace ran out with requests still in flight.
    pub abandoned: bool,
}

/// Drives one time-boxed run: start the worker pool, wait out the duration,
/// stop admissions, drain and freeze the results.
#[derive(Debug)]
pub struct RunController {
    config: RunConfig,
    state: AtomicU8,
}

impl RunController {
    #[must_use]
    pub const fn new(config: RunConfig) -> Self {
        Self {
            config,
            state: AtomicU8::new(STATE_IDLE),
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        RunState::from_raw(self.state.load(Ordering::Acquire))
    }

    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the load test to completion. May be called once per controller.
    ///
    /// A controller that fails after starting still ends up
    /// [`RunState::Finished`], and every executor still in flight is told to
    /// give up.
    ///
    /// # Errors
    ///
    /// Returns an error when the concurrency does not fit the admission
    /// semaphore, the run was already started, the duration cannot be turned
    /// into a deadline, or a background task failed.
    pub async fn run<E: Executor>(&self, executor: Arc<E>) -> AppResult<RunOutcome> {
        let permits = self.admission_permits()?;
        if self
            .state
            .compare_exchange(STATE_IDLE, STATE_RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::run(RunError::AlreadyStarted));
        }

        let (abort_tx, _) = shutdown_channel();
        let result = self.drive(executor, permits, &abort_tx).await;
        if let Err(err) = &result {
            warn!("Run failed: {}", err);
            drop(abort_tx.send(()));
        }
        self.state.store(STATE_FINISHED, Ordering::Release);
        result
    }

    fn admission_permits(&self) -> AppResult<u32> {
        let concurrency = self.config.concurrency.get();
        u32::try_from(concurrency).map_err(|_err| {
            AppError::validation(ValidationError::ConcurrencyTooLarge {
                value: concurrency,
                max: crate::config::MAX_CONCURRENCY,
            })
        })
    }

    async fn drive<E: Executor>(
        &self,
        executor: Arc<E>,
        permits: u32,
        abort_tx: &ShutdownSender,
    ) -> AppResult<RunOutcome> {
        let concurrency = self.config.concurrency.get();
        let run_start = Instant::now();
        let deadline = run_start
            .checked_add(self.config.duration)
            .ok_or_else(|| AppError::validation(ValidationError::DurationOverflow))?;

        let slots = Arc::new(Semaphore::new(concurrency));
        let (outcome_tx, outcome_rx) =
            mpsc::channel::<RequestOutcome>(concurrency.max(MIN_OUTCOME_CHANNEL_CAPACITY));
        let collector = setup_result_collector(outcome_rx);
        let (stop_tx, _) = shutdown_channel();

        info!(
            "Starting run against {} with {} workers for {:?}.",
            self.config.target_url, concurrency, self.config.duration
        );
        let dispatcher = spawn_dispatcher(executor, &slots, outcome_tx, &stop_tx, abort_tx);

        tokio::time::sleep_until(deadline).await;

        self.state.store(STATE_DRAINING, Ordering::Release);
        debug!("Deadline reached; stopping admissions.");
        drop(stop_tx.send(()));
        let launched = dispatcher.await?;

        let abandoned = match tokio::time::timeout(
            self.config.drain_grace,
            slots.acquire_many(permits),
        )
        .await
        {
            Ok(Ok(_all_slots)) => false,
            Ok(Err(_closed)) => return Err(AppError::run(RunError::SlotsClosed)),
            Err(_elapsed) => {
                warn!(
                    "Drain grace of {:?} elapsed with requests still in flight; abandoning them.",
                    self.config.drain_grace
                );
                drop(abort_tx.send(()));
                true
            }
        };

        let results = collector
            .freeze()
            .await
            .map_err(|_err| AppError::run(RunError::CollectorStopped))?;
        let elapsed = run_start.elapsed();

        info!(
            "Run finished after {:?}: {} launched, {} sampled, {} failed.",
            elapsed,
            launched,
            results.request_count(),
            results.failed_requests()
        );

        Ok(RunOutcome {
            results,
            launched,
            elapsed,
            abandoned,
        })
    }
}
