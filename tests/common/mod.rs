#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;

use agentry::domain::agent::Agent;

/// Replays a fixed decision script, then keeps answering "nothing to do".
pub struct ScriptedAgent {
    name: String,
    script: Vec<bool>,
    cursor: usize,
    pub invocations: Arc<AtomicUsize>,
}

impl ScriptedAgent {
    pub fn new(name: &str, script: Vec<bool>) -> Self {
        Self {
            name: name.to_string(),
            script,
            cursor: 0,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.invocations.clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pick_and_execute(&mut self) -> Result<bool> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let more = self.script.get(self.cursor).copied().unwrap_or(false);
        self.cursor += 1;
        Ok(more)
    }
}

/// Fails the first `failures` decision passes, then idles.
pub struct FailingAgent {
    name: String,
    failures: usize,
    pub invocations: Arc<AtomicUsize>,
}

impl FailingAgent {
    pub fn new(name: &str, failures: usize) -> Self {
        Self {
            name: name.to_string(),
            failures,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.invocations.clone()
    }
}

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pick_and_execute(&mut self) -> Result<bool> {
        let seen = self.invocations.fetch_add(1, Ordering::SeqCst);
        if seen < self.failures {
            bail!("injected failure #{}", seen + 1);
        }
        Ok(false)
    }
}

/// Poll `cond` until it holds or the test times out.
pub async fn wait_until<F: Fn() -> bool>(cond: F, what: &str) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {}", what);
}

/// Assert that `counter` stays at `expected` for a while.
pub async fn assert_count_stays(counter: &AtomicUsize, expected: usize) {
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(counter.load(Ordering::SeqCst), expected);
}
