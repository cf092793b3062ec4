//! Activation and deactivation of unit-aware operators
//!
//! The unit layer has two states. While **inactive** (the initial state)
//! [`UnitfulArray`](crate::UnitfulArray) operators are plain host arithmetic.
//! [`activate`] captures the host operators, switches to unit-aware
//! arithmetic and sets the keep-attributes policy; [`deactivate`] drops the
//! captured operators again. Both are idempotent.
//!
//! The state is process-wide. Calls to [`activate`]/[`deactivate`] must be
//! serialized by the caller (typically: once at start-up); arithmetic only
//! ever reads the state and is safe to run from many threads.

use crate::config::UnitConfig;
use crate::ops::Activation;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

static STATE: RwLock<Activation> = RwLock::new(Activation::INACTIVE);

fn read() -> RwLockReadGuard<'static, Activation> {
    STATE.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Activation> {
    STATE.write().unwrap_or_else(PoisonError::into_inner)
}

/// Install unit-aware operators.
///
/// When already active only the `keep_si` flag is updated.
pub fn activate(keep_si: bool) {
    activate_with(UnitConfig {
        keep_si,
        ..UnitConfig::default()
    });
}

/// [`activate`] with the full configuration.
pub fn activate_with(config: UnitConfig) {
    let mut state = write();
    if state.is_active() {
        state.set_keep_si(config.keep_si);
        debug!(keep_si = config.keep_si, "unit operators already active, updated keep_si");
        return;
    }
    *state = Activation::active(config);
    debug!(
        keep_si = config.keep_si,
        keep_attrs = config.keep_attrs,
        "unit operators activated"
    );
}

/// Restore plain host arithmetic. The keep-attributes policy stays as it was.
pub fn deactivate() {
    let mut state = write();
    if !state.is_active() {
        return;
    }
    *state = state.deactivated();
    debug!("unit operators deactivated");
}

pub fn is_active() -> bool {
    read().is_active()
}

/// Snapshot of the current state
pub fn current() -> Activation {
    *read()
}
