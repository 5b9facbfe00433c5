// ============================================================================
// Event Handler Interface
// Defines the contract for observing keystrokes processed by a calculator
// ============================================================================

use crate::numeric::CalcError;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by a calculator engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalculatorEvent {
    /// Key applied; `display` is the text shown afterwards
    KeyProcessed {
        key_id: String,
        display: String,
        timestamp: DateTime<Utc>,
    },

    /// Key dropped because the calculator is switched off
    KeyIgnored {
        key_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Key failed with a soft error; registers were left untouched
    ErrorRaised {
        key_id: String,
        error: CalcError,
        timestamp: DateTime<Utc>,
    },

    /// ON key toggled the power state
    PowerChanged {
        power_on: bool,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing calculator events
/// Implementations can handle logging, tape printing, UI refresh, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a calculator event
    fn on_event(&self, event: CalculatorEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<CalculatorEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: CalculatorEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: CalculatorEvent) {
        match &event {
            CalculatorEvent::ErrorRaised { key_id, error, .. } => {
                tracing::info!(key = %key_id, %error, "Calculator error");
            }
            _ => tracing::debug!("Calculator event: {:?}", event),
        }
    }
}
