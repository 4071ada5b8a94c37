use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admits at most one outstanding lookup per widget.
///
/// While an [`InFlightGuard`] is alive the gate is closed and the widget's
/// submit control counts as disabled. Dropping the guard reopens it, so
/// every exit path of a lookup (success, bad payload, failure, panic, a
/// discarded message) releases the gate.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    busy: Arc<AtomicBool>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        Some(InFlightGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
