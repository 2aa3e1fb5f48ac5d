//! Agent wake/poll scheduling.
//!
//! Decouples "something relevant changed" notifications from an agent's
//! decision logic: every signal guarantees at least one subsequent pass of
//! the decision callback, concurrent signals coalesce into a single wake,
//! and the callback is re-invoked until it reports no further action is
//! possible. The callback never overlaps with itself for the same agent.

mod context;
mod signal_slot;

pub use signal_slot::SignalSlot;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::application::monitoring::agent_status::AgentStatusRegistry;
use crate::config::SchedulerConfig;
use crate::domain::agent::Agent;
use crate::domain::errors::SchedulerError;

use context::{ContextOutcome, ContextState, run_loop};

/// Cheap cloneable handle collaborators use to wake an agent after
/// mutating state it should react to. Also usable from inside the agent's
/// own decision callback.
#[derive(Clone)]
pub struct SignalHandle {
    slot: Arc<SignalSlot>,
}

impl SignalHandle {
    /// Raise the agent's wake token. Never blocks, never fails.
    pub fn signal(&self) {
        self.slot.raise();
    }
}

struct ExecutionContext {
    state: Arc<ContextState>,
    handle: JoinHandle<ContextOutcome>,
}

/// Drives one agent: owns its signal slot and at most one live execution
/// context at a time.
///
/// The slot outlives individual contexts, so a signal raised while the
/// agent is stopped (or stopping) is delivered to the next context instead
/// of being dropped.
pub struct AgentScheduler<A: Agent> {
    name: String,
    agent: Arc<Mutex<A>>,
    slot: Arc<SignalSlot>,
    config: SchedulerConfig,
    registry: Option<Arc<AgentStatusRegistry>>,
    context: Option<ExecutionContext>,
}

impl<A: Agent> AgentScheduler<A> {
    pub fn new(agent: A) -> Self {
        Self::with_config(agent, SchedulerConfig::default(), None)
    }

    pub fn with_config(
        agent: A,
        config: SchedulerConfig,
        registry: Option<Arc<AgentStatusRegistry>>,
    ) -> Self {
        let name = agent.name().to_string();
        Self {
            name,
            agent: Arc::new(Mutex::new(agent)),
            slot: Arc::new(SignalSlot::new()),
            config,
            registry,
            context: None,
        }
    }

    /// Agent name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wake the agent: ensure its wait primitive has a token available.
    ///
    /// Multiple calls before the token is consumed produce exactly one
    /// wake. Never blocks, never fails.
    pub fn signal(&self) {
        self.slot.raise();
    }

    /// Handle for external collaborators that need to wake this agent.
    pub fn signal_handle(&self) -> SignalHandle {
        SignalHandle {
            slot: self.slot.clone(),
        }
    }

    /// Ensure exactly one live execution context for this agent.
    ///
    /// Spawns one if none is running; otherwise pokes the current wait,
    /// which re-checks its flags and goes back to sleep. A token raised
    /// before the first start is consumed by the new context immediately.
    pub fn start(&mut self) {
        if let Some(ctx) = &self.context {
            if !ctx.handle.is_finished() {
                ctx.state.poke();
                return;
            }
            warn!(
                "Agent '{}': previous execution context ended on its own; spawning a fresh one.",
                self.name
            );
        }

        let state = Arc::new(ContextState::new());
        let handle = tokio::spawn(run_loop(
            self.name.clone(),
            self.agent.clone(),
            self.slot.clone(),
            state.clone(),
            self.config.clone(),
            self.registry.clone(),
        ));
        self.context = Some(ExecutionContext { state, handle });
    }

    /// Tear down the current execution context, if any.
    ///
    /// Once this returns, no further decision-callback invocations occur
    /// until `start()` creates a fresh context. A signal racing the stop
    /// stays in the slot and is delivered to that fresh context. Calling
    /// this when never started is a no-op.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let Some(ctx) = self.context.take() else {
            return Ok(());
        };

        ctx.state.request_shutdown();
        match ctx.handle.await {
            Ok(ContextOutcome::Stopped) => Ok(()),
            Ok(ContextOutcome::GaveUp {
                consecutive_failures,
            }) => Err(SchedulerError::FailureCapReached {
                name: self.name.clone(),
                failures: consecutive_failures,
            }),
            Err(e) if e.is_panic() => Err(SchedulerError::ContextPanicked {
                name: self.name.clone(),
            }),
            Err(_) => Ok(()),
        }
    }

    /// Whether a live execution context is associated with this agent.
    pub fn is_running(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| !ctx.handle.is_finished())
    }
}
