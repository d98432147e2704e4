// Process-wide privilege escalation switch

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// On/off switch consulted by every command execution.
///
/// Owned by the composition root and shared by clone; all clones flip
/// together.
#[derive(Debug, Clone, Default)]
pub struct EscalationSwitch {
    enabled: Arc<AtomicBool>,
}

impl EscalationSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}
