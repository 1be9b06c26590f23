/// Engine-wide context shared with nodes and components.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use super::options::EngineOptions;
use super::time::Clock;

/// Cloneable control over a running engine. Every loop polls
/// `is_running` once per iteration; `stop` makes all of them exit.
#[derive(Debug, Clone, Default)]
pub struct EngineHandle {
    running: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Returns `false` if the engine was already running.
    pub(crate) fn start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Services shared by everything the engine drives.
pub struct EngineContext {
    clock: Arc<dyn Clock>,
    handle: EngineHandle,
    options: EngineOptions,
}

impl EngineContext {
    pub fn new(clock: Arc<dyn Clock>, handle: EngineHandle, options: EngineOptions) -> Self {
        Self { clock, handle, options }
    }

    /// Engine time in seconds.
    pub fn time(&self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("time", &self.time())
            .field("running", &self.handle.is_running())
            .finish()
    }
}
