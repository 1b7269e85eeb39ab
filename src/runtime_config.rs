//! Environment-driven runtime configuration.
//!
//! Knobs, all optional:
//!
//! - `TWINSERVE_STACK_SIZE` — worker coroutine stack size, decimal or
//!   `0x`-prefixed hex. Default `0x10000` (64 KB).
//! - `TWINSERVE_WORKERS` — worker coroutines in the pool. Default 2, one
//!   per transport.
//! - `TWINSERVE_TICK_MS` — manager tick delay in milliseconds. Default
//!   1000. A policy knob, not an invariant.

use std::time::Duration;

/// Runtime knobs for the manager loop and worker pool.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Stack size for worker coroutines, in bytes.
    pub stack_size: usize,
    /// Number of worker coroutines.
    pub workers: usize,
    /// Cooperative delay between manager ticks.
    pub tick: Duration,
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let stack_size = std::env::var("TWINSERVE_STACK_SIZE")
            .ok()
            .and_then(|v| parse_stack_size(&v))
            .unwrap_or(defaults.stack_size);

        let workers = std::env::var("TWINSERVE_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.workers);

        let tick = std::env::var("TWINSERVE_TICK_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.tick);

        Self {
            stack_size,
            workers,
            tick,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: 0x10000,
            workers: 2,
            tick: Duration::from_secs(1),
        }
    }
}

fn parse_stack_size(value: &str) -> Option<usize> {
    if let Some(hex) = value.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}
