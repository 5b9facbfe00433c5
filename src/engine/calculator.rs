// ============================================================================
// Calculator Engine
// Owns one calculator state and feeds it keystrokes
// ============================================================================

use super::transition::transition;
use crate::domain::{CalculatorConfig, CalculatorState, Key, KeyEvent, StateSnapshot};
use crate::interfaces::{CalculatorEvent, EventHandler};
use chrono::Utc;
use std::sync::Arc;

#[cfg(feature = "serde")]
use crate::interfaces::{StateStore, StoreError};

/// A single calculator: state, configuration and an observer.
///
/// Every keystroke replaces the state wholesale; the previous value is never
/// patched in place.
pub struct Calculator {
    /// Current state
    state: CalculatorState,

    /// Rendering conventions and start-up modes
    config: CalculatorConfig,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl Calculator {
    /// Create a calculator in its power-on state
    pub fn new(config: CalculatorConfig, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            state: config.initial_state(),
            config,
            event_handler,
        }
    }

    /// Create a calculator resuming from a saved state
    pub fn with_state(
        state: CalculatorState,
        config: CalculatorConfig,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            state,
            config,
            event_handler,
        }
    }

    /// Process an external key event
    pub fn process(&mut self, event: &KeyEvent) -> Vec<CalculatorEvent> {
        self.apply(Key::from(event), event.id.clone())
    }

    /// Process a typed key
    pub fn press(&mut self, key: Key) -> Vec<CalculatorEvent> {
        let key_id = KeyEvent::from(key).id;
        self.apply(key, key_id)
    }

    /// Process a sequence of keys, discarding the events
    pub fn press_all<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = Key>,
    {
        for key in keys {
            self.press(key);
        }
    }

    fn apply(&mut self, key: Key, key_id: String) -> Vec<CalculatorEvent> {
        let mut events = Vec::with_capacity(2);

        if !self.state.power_on && key != Key::Power {
            events.push(CalculatorEvent::KeyIgnored {
                key_id,
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events.clone());
            return events;
        }

        let next = transition(&self.state, key, &self.config);

        if next.power_on != self.state.power_on {
            events.push(CalculatorEvent::PowerChanged {
                power_on: next.power_on,
                timestamp: Utc::now(),
            });
        }

        match next.error {
            Some(error) => events.push(CalculatorEvent::ErrorRaised {
                key_id,
                error,
                timestamp: Utc::now(),
            }),
            None => events.push(CalculatorEvent::KeyProcessed {
                key_id,
                display: next.display.clone(),
                timestamp: Utc::now(),
            }),
        }

        self.state = next;
        self.event_handler.on_events(events.clone());
        events
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Text currently on the display
    pub fn display(&self) -> String {
        self.state.display_text()
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Replace the whole state, e.g. with one loaded elsewhere
    pub fn restore(&mut self, state: CalculatorState) {
        self.state = state;
    }

    /// Back to the configured power-on state
    pub fn reset(&mut self) {
        self.state = self.config.initial_state();
    }

    /// Persist the current state
    #[cfg(feature = "serde")]
    pub fn save_to(&self, store: &dyn StateStore) -> Result<(), StoreError> {
        store.save(&self.state)
    }

    /// Restore from a store; returns whether a saved state was found
    #[cfg(feature = "serde")]
    pub fn load_from(&mut self, store: &dyn StateStore) -> Result<bool, StoreError> {
        match store.load()? {
            Some(state) => {
                self.state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArithOp, KeyAction, KeyValue, Modifier};
    use crate::interfaces::NoOpEventHandler;
    use crate::numeric::CalcError;

    fn calculator() -> Calculator {
        Calculator::new(CalculatorConfig::default(), Arc::new(NoOpEventHandler))
    }

    #[test]
    fn test_process_key_events() {
        let mut calc = calculator();
        for id in ["1", "2"] {
            calc.process(&KeyEvent::new(id, KeyAction::Num));
        }
        calc.process(&KeyEvent::new("ENTER", KeyAction::Enter));
        calc.process(&KeyEvent::new("3", KeyAction::Num));
        let events = calc.process(
            &KeyEvent::new("MUL", KeyAction::Op).with_value(KeyValue::Text("*".to_string())),
        );

        assert_eq!(calc.state().stack.x(), 36.0);
        assert_eq!(calc.display(), "36.00");
        assert!(matches!(
            &events[..],
            [CalculatorEvent::KeyProcessed { key_id, display, .. }]
                if key_id == "MUL" && display == "36.00"
        ));
    }

    #[test]
    fn test_error_event() {
        let mut calc = calculator();
        let events = calc.press(Key::Func(crate::domain::FuncKey::Reciprocal));
        assert!(matches!(
            &events[..],
            [CalculatorEvent::ErrorRaised {
                error: CalcError::DivisionByZero,
                ..
            }]
        ));
        assert_eq!(calc.display(), "Error 0");
    }

    #[test]
    fn test_power_events() {
        let mut calc = calculator();
        let events = calc.press(Key::Power);
        assert!(matches!(
            events[0],
            CalculatorEvent::PowerChanged { power_on: false, .. }
        ));

        let events = calc.press(Key::Digit(4));
        assert!(matches!(events[..], [CalculatorEvent::KeyIgnored { .. }]));
        assert!(calc.state().input_buffer.is_none());
    }

    #[test]
    fn test_reset_restores_configured_state() {
        let config = CalculatorConfig::new().with_decimals(4);
        let mut calc = Calculator::new(config, Arc::new(NoOpEventHandler));
        calc.press_all([Key::Digit(9), Key::Enter, Key::Arith(ArithOp::Add)]);
        calc.press(Key::Shift(Modifier::G));
        calc.reset();
        assert_eq!(calc.state(), &config.initial_state());
        assert_eq!(calc.display(), "0.0000");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_save_and_load() {
        use crate::interfaces::MemoryStateStore;

        let store = MemoryStateStore::new();
        let mut calc = calculator();
        assert!(!calc.load_from(&store).unwrap());

        calc.press_all([Key::Digit(7), Key::Enter]);
        calc.save_to(&store).unwrap();

        let mut resumed = calculator();
        assert!(resumed.load_from(&store).unwrap());
        assert_eq!(resumed.state(), calc.state());
    }
}
