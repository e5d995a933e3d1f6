//! The external "show overlay" flag.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Synchronously readable enablement flag. When it reads `false` the overlay
/// neither records messages nor touches the GPU.
pub trait OverlaySwitch {
    fn overlay_enabled(&self) -> bool;
}

impl OverlaySwitch for bool {
    fn overlay_enabled(&self) -> bool {
        *self
    }
}

impl OverlaySwitch for Rc<Cell<bool>> {
    fn overlay_enabled(&self) -> bool {
        self.get()
    }
}

impl OverlaySwitch for Arc<AtomicBool> {
    fn overlay_enabled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_switch_sees_later_writes() {
        let flag = Rc::new(Cell::new(true));
        let switch: Box<dyn OverlaySwitch> = Box::new(flag.clone());
        assert!(switch.overlay_enabled());
        flag.set(false);
        assert!(!switch.overlay_enabled());
    }

    #[test]
    fn atomic_switch_reads_current_value() {
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.overlay_enabled());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.overlay_enabled());
    }
}
