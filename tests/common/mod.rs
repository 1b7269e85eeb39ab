//! Shared helpers for the integration suite.

use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize tracing and the may runtime once per test binary.
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
        may::config().set_stack_size(0x8000);
    });
}

/// Poll `done` every 5 ms until it returns true or `deadline_ms` elapses.
pub fn wait_until(deadline_ms: u64, mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..deadline_ms / 5 {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}
