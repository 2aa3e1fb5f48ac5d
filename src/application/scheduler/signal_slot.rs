use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Binary coalescing wake gate.
///
/// Holds at most one outstanding wake token. Raises that land before the
/// token is consumed collapse into a single wake, so the woken agent
/// re-evaluates all of its state instead of processing discrete events.
pub struct SignalSlot {
    pending: AtomicBool,
    notify: Notify,
}

impl SignalSlot {
    /// A fresh slot holds no token; the owner waits until the first raise.
    pub fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Make a wake token available.
    ///
    /// Idempotent while a token is already pending. Never blocks, never
    /// fails, callable from any task or thread.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            if self.try_consume() {
                return;
            }
            // The pending flag is the source of truth; the Notify permit is
            // only a hint, so a stale permit just loops back here.
            self.notify.notified().await;
        }
    }

    /// Consume the token if one is pending.
    pub fn try_consume(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Whether a token is currently pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for SignalSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_acquire_pends_until_raised() {
        let slot = SignalSlot::new();
        let mut acquire = task::spawn(slot.acquire());

        assert_pending!(acquire.poll());

        slot.raise();
        assert!(acquire.is_woken());
        assert_ready!(acquire.poll());
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn test_raises_coalesce_into_one_token() {
        let slot = SignalSlot::new();
        slot.raise();
        slot.raise();
        slot.raise();

        slot.acquire().await;

        // All three raises were one token; the next wait must block.
        let mut acquire = task::spawn(slot.acquire());
        assert_pending!(acquire.poll());
    }

    #[tokio::test]
    async fn test_raise_before_wait_is_not_lost() {
        let slot = SignalSlot::new();
        slot.raise();

        let mut acquire = task::spawn(slot.acquire());
        assert_ready!(acquire.poll());
    }

    #[test]
    fn test_try_consume_is_one_shot() {
        let slot = SignalSlot::new();
        slot.raise();
        assert!(slot.try_consume());
        assert!(!slot.try_consume());
    }
}
