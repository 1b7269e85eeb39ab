//! Process-wide transport registry.
//!
//! A boot-time convenience: wiring code drops the two transport handles in
//! here, and whoever constructs the [`crate::manager::RequestManager`]
//! picks them up. Prefer passing handles directly when you can; the
//! registry exists for setups where the transports are brought up far from
//! the manager.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::server::Transport;

static LOCAL: Lazy<RwLock<Option<Arc<dyn Transport>>>> = Lazy::new(|| RwLock::new(None));
static CLOUD: Lazy<RwLock<Option<Arc<dyn Transport>>>> = Lazy::new(|| RwLock::new(None));

/// Register the local (primary) transport.
pub fn set_local_transport(transport: Arc<dyn Transport>) {
    *LOCAL.write().unwrap() = Some(transport);
}

/// Register the cloud (secondary) transport.
pub fn set_cloud_transport(transport: Arc<dyn Transport>) {
    *CLOUD.write().unwrap() = Some(transport);
}

#[must_use]
pub fn local_transport() -> Option<Arc<dyn Transport>> {
    LOCAL.read().unwrap().clone()
}

#[must_use]
pub fn cloud_transport() -> Option<Arc<dyn Transport>> {
    CLOUD.read().unwrap().clone()
}

/// Drop both registrations. Mainly for tests.
pub fn clear() {
    *LOCAL.write().unwrap() = None;
    *CLOUD.write().unwrap() = None;
}
