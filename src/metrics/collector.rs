use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{RequestOutcome, ResultSet};

/// Handle to the task that owns the [`ResultSet`] for the duration of a run.
pub struct ResultCollector {
    freeze_tx: oneshot::Sender<()>,
    handle: JoinHandle<ResultSet>,
}

impl ResultCollector {
    /// Stops accepting outcomes and returns everything recorded so far.
    ///
    /// Outcomes already queued when the freeze lands are kept; later sends
    /// fail on the sender side.
    ///
    /// # Errors
    ///
    /// Returns an error when the collector task panicked.
    pub async fn freeze(self) -> Result<ResultSet, tokio::task::JoinError> {
        if self.freeze_tx.send(()).is_err() {
            debug!("Result collector already stopped.");
        }
        self.handle.await
    }
}

/// Spawns the single owner of the run's [`ResultSet`].
#[must_use]
pub fn setup_result_collector(mut outcome_rx: mpsc::Receiver<RequestOutcome>) -> ResultCollector {
    let (freeze_tx, mut freeze_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let mut results = ResultSet::new();

        loop {
            tokio::select! {
                _ = &mut freeze_rx => break,
                maybe_outcome = outcome_rx.recv() => {
                    match maybe_outcome {
                        Some(outcome) => results.record(outcome),
                        None => break,
                    }
                }
            }
        }

        outcome_rx.close();
        while let Ok(outcome) = outcome_rx.try_recv() {
            results.record(outcome);
        }
        debug!(
            "Result set frozen with {} samples and {} failures.",
            results.request_count(),
            results.failed_requests()
        );
        results
    });

    ResultCollector { freeze_tx, handle }
}
