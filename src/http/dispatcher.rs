use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::RequestOutcome;
use crate::shutdown::ShutdownSender;

use super::executor::Executor;

/// Spawns the worker pool loop.
///
/// Each iteration takes one admission slot from `slots` (waiting while all
/// are taken) and launches one executor task that owns the slot until its
/// outcome has been handed to the collector. `stop_tx` ends the loop before
/// the next admission; `abort_tx` makes still-running executors give up
/// without recording anything.
///
/// The returned handle resolves to the number of launched requests.
pub fn spawn_dispatcher<E: Executor>(
    executor: Arc<E>,
    slots: &Arc<Semaphore>,
    outcome_tx: mpsc::Sender<RequestOutcome>,
    stop_tx: &ShutdownSender,
    abort_tx: &ShutdownSender,
) -> JoinHandle<u64> {
    let mut stop_rx = stop_tx.subscribe();
    let slots = Arc::clone(slots);
    let abort_tx = abort_tx.clone();

    tokio::spawn(async move {
        let mut launched: u64 = 0;

        loop {
            let permit = tokio::select! {
                biased;
                _ = stop_rx.recv() => break,
                permit = Arc::clone(&slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let executor = Arc::clone(&executor);
            let outcome_tx = outcome_tx.clone();
            let mut abort_rx = abort_tx.subscribe();

            tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = abort_rx.recv() => return,
                    outcome = executor.execute() => outcome,
                };
                if outcome_tx.send(outcome).await.is_err() {
                    debug!("Result set already frozen; dropping late outcome.");
                }
                drop(permit);
            });

            launched = launched.saturating_add(1);
        }

        debug!("Dispatcher stopped after launching {} requests.", launched);
        launched
    })
}
