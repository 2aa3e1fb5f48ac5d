//! Configuration for the scheduling runtime.
//!
//! Loaded from environment variables in `from_env()`, with defaults that
//! suit tests and library embedding (no env access required).

use anyhow::{Context, Result};
use std::env;

/// Scheduling policy shared by every agent scheduler built from it.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Stop an agent's execution context after this many consecutive
    /// decision-callback failures. `None` (the default) keeps the context
    /// alive no matter how often the callback fails.
    pub max_consecutive_failures: Option<u32>,
}

impl SchedulerConfig {
    /// Load configuration from environment variables.
    ///
    /// `AGENT_MAX_CONSECUTIVE_FAILURES` — unset or `0` means unlimited.
    pub fn from_env() -> Result<Self> {
        let max_consecutive_failures =
            parse_failure_cap(env::var("AGENT_MAX_CONSECUTIVE_FAILURES").ok().as_deref())?;

        Ok(Self {
            max_consecutive_failures,
        })
    }
}

pub(crate) fn parse_failure_cap(raw: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value: u32 = raw.trim().parse().with_context(|| {
        format!(
            "Invalid AGENT_MAX_CONSECUTIVE_FAILURES: '{}'. Must be a non-negative integer",
            raw
        )
    })?;

    // 0 disables the cap rather than stopping agents on their first failure.
    Ok(if value == 0 { None } else { Some(value) })
}
