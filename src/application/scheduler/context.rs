use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info};

use crate::application::monitoring::agent_status::{AgentStatusRegistry, HealthStatus};
use crate::application::scheduler::signal_slot::SignalSlot;
use crate::config::SchedulerConfig;
use crate::domain::agent::Agent;

/// Per-context control state.
///
/// Shutdown is deliberately kept separate from the work-pending token so a
/// stop request can never be mistaken for a wake, and vice versa.
pub(super) struct ContextState {
    shutdown: AtomicBool,
    rearm: Notify,
}

impl ContextState {
    pub(super) fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
            rearm: Notify::new(),
        }
    }

    pub(super) fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.rearm.notify_one();
    }

    /// Benign wake of the current wait; the loop re-checks its flags and
    /// goes back to sleep if nothing changed.
    pub(super) fn poke(&self) {
        self.rearm.notify_one();
    }

    pub(super) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// How an execution context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ContextOutcome {
    /// Shut down by request.
    Stopped,
    /// Gave up after hitting the configured consecutive-failure cap.
    GaveUp { consecutive_failures: u32 },
}

/// The wait/poll loop run on the agent's dedicated task.
///
/// Sleeps until a wake token (or a re-arm poke) arrives, then invokes the
/// decision callback repeatedly until it reports no further action is
/// possible, and returns to waiting. A callback failure is logged and the
/// loop keeps scheduling; only a stop request (or the failure cap) ends it.
pub(super) async fn run_loop<A: Agent>(
    name: String,
    agent: Arc<Mutex<A>>,
    slot: Arc<SignalSlot>,
    state: Arc<ContextState>,
    config: SchedulerConfig,
    registry: Option<Arc<AgentStatusRegistry>>,
) -> ContextOutcome {
    info!("Agent '{}': execution context started.", name);
    if let Some(reg) = &registry {
        reg.update_heartbeat(&name, HealthStatus::Starting).await;
    }

    let mut consecutive_failures: u32 = 0;
    let mut invocations: u64 = 0;

    loop {
        if state.shutdown_requested() {
            break;
        }

        // The only suspension point: wait for a wake token or a poke.
        let woke = tokio::select! {
            _ = slot.acquire() => true,
            _ = state.rearm.notified() => false,
        };

        if !woke {
            // Re-arm or shutdown poke; loop back and re-check the flag.
            debug!("Agent '{}': benign wake, re-checking state.", name);
            continue;
        }

        if state.shutdown_requested() {
            // The token lost the race against stop(). Hand it back so the
            // next context resumes the pending work instead of dropping it.
            slot.raise();
            break;
        }

        // Drain: one unit of work per invocation, repeated for as long as
        // the agent reports that more may be possible.
        let mut action_owed = true;
        while action_owed {
            if state.shutdown_requested() {
                slot.raise();
                break;
            }

            let result = agent.lock().await.pick_and_execute().await;
            invocations += 1;

            match result {
                Ok(more) => {
                    action_owed = more;
                    consecutive_failures = 0;
                }
                Err(e) => {
                    // Never die on a bad decision attempt: report it and go
                    // back to waiting for the next signal.
                    error!(
                        "Agent '{}': unexpected failure in decision callback: {:#}",
                        name, e
                    );
                    consecutive_failures += 1;
                    if let Some(reg) = &registry {
                        reg.update_heartbeat(&name, HealthStatus::Degraded).await;
                        reg.update_metric(&name, "last_error", format!("{e:#}")).await;
                    }
                    action_owed = false;
                }
            }
        }

        if state.shutdown_requested() {
            break;
        }

        if let Some(cap) = config.max_consecutive_failures
            && consecutive_failures >= cap
        {
            error!(
                "Agent '{}': giving up after {} consecutive failures.",
                name, consecutive_failures
            );
            if let Some(reg) = &registry {
                reg.update_heartbeat(&name, HealthStatus::Stopped).await;
            }
            return ContextOutcome::GaveUp {
                consecutive_failures,
            };
        }

        if consecutive_failures == 0
            && let Some(reg) = &registry
        {
            reg.update_heartbeat(&name, HealthStatus::Healthy).await;
            reg.update_metric(&name, "invocations", invocations.to_string())
                .await;
        }
    }

    info!("Agent '{}': execution context stopped.", name);
    if let Some(reg) = &registry {
        reg.update_heartbeat(&name, HealthStatus::Stopped).await;
    }
    ContextOutcome::Stopped
}
