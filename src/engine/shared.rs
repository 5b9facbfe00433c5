// ============================================================================
// Shared Calculator
// Thread-safe handle serializing keystrokes under one exclusive lock
// ============================================================================

use super::calculator::Calculator;
use crate::domain::{CalculatorState, Key, KeyEvent, StateSnapshot};
use crate::interfaces::CalculatorEvent;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to one calculator.
///
/// Each key is applied while holding the lock, so events from different
/// threads are processed one at a time in lock order.
#[derive(Clone)]
pub struct SharedCalculator {
    inner: Arc<Mutex<Calculator>>,
}

impl SharedCalculator {
    pub fn new(calculator: Calculator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(calculator)),
        }
    }

    pub fn process(&self, event: &KeyEvent) -> Vec<CalculatorEvent> {
        self.inner.lock().process(event)
    }

    pub fn press(&self, key: Key) -> Vec<CalculatorEvent> {
        self.inner.lock().press(key)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.lock().snapshot()
    }

    /// Copy of the full state
    pub fn state(&self) -> CalculatorState {
        self.inner.lock().state().clone()
    }

    /// Run `f` with exclusive access, e.g. to press several keys atomically
    pub fn with<R>(&self, f: impl FnOnce(&mut Calculator) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<Calculator> for SharedCalculator {
    fn from(calculator: Calculator) -> Self {
        Self::new(calculator)
    }
}
