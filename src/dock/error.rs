use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DockError {
    /// No running task and no launcher app could fill an empty slot. This is
    /// a configuration problem (too few launchable apps for the capacity),
    /// not something a caller can recover from at runtime.
    #[error("cannot find enough apps to place in the dock: slot {index} of {capacity} stays empty")]
    CandidatesExhausted { index: usize, capacity: usize },
}
