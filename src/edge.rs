//! Edge counter shared between an interrupt handler and the main loop.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counts rising edges on the oscillator monitor line.
///
/// `record` runs in interrupt context; everything else runs in the main loop.
pub struct EdgeCounter {
    edges: AtomicU32,
}

impl EdgeCounter {
    pub const fn new() -> Self {
        EdgeCounter {
            edges: AtomicU32::new(0),
        }
    }

    pub fn record(&self) {
        self.edges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u32 {
        self.edges.load(Ordering::Relaxed)
    }

    /// Edges seen since `earlier`, correct across wrap.
    pub fn since(&self, earlier: u32) -> u32 {
        self.count().wrapping_sub(earlier)
    }
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}
