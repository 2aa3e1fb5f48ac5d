use anyhow::Result;
use async_trait::async_trait;

/// Capability every concrete agent supplies to its scheduler.
///
/// The scheduler owns the loop; the agent owns the decisions. Whenever
/// relevant state changes, someone signals the scheduler, and the scheduler
/// calls [`pick_and_execute`](Agent::pick_and_execute) repeatedly until it
/// reports that no further action is possible.
#[async_trait]
pub trait Agent: Send + 'static {
    /// Agent name used in diagnostics.
    fn name(&self) -> &str;

    /// Perform at most one unit of action appropriate for the current state.
    ///
    /// Returns `Ok(true)` iff some action was executed that might have
    /// changed state, in which case the scheduler calls again immediately
    /// without waiting for a new signal. `Ok(false)` means "nothing to do"
    /// and is not an error. `Err` is reserved for genuinely unexpected
    /// failures; the scheduler logs it and keeps scheduling.
    ///
    /// Must not block indefinitely.
    async fn pick_and_execute(&mut self) -> Result<bool>;
}
