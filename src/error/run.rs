use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run was already started.")]
    AlreadyStarted,
    #[error("Admission slots were closed before the run finished.")]
    SlotsClosed,
    #[error("Result collector stopped before the run finished.")]
    CollectorStopped,
}
