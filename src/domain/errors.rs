use thiserror::Error;

/// Errors surfaced by an agent's scheduling lifecycle
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Execution context for agent '{name}' panicked")]
    ContextPanicked { name: String },

    #[error("Agent '{name}' gave up after {failures} consecutive failures")]
    FailureCapReached { name: String, failures: u32 },
}
