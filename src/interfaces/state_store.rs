// ============================================================================
// State Store Interface
// Load/save of the whole calculator state as one JSON record
// ============================================================================

use crate::domain::{CalculatorState, EntryBuffer};
use crate::finance::{CashFlow, CashFlowLedger, MAX_REPEAT, MIN_REPEAT};
use crate::numeric::MAX_DECIMALS;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failures while moving state in or out of a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record is not JSON, or the state could not be encoded
    #[error("calculator state codec failed: {0}")]
    Codec(#[from] serde_json::Error),

    /// The record parsed but is not a JSON object
    #[error("persisted calculator state is not a record")]
    NotARecord,

    /// Storage backend failure
    #[error("state backend failed: {0}")]
    Backend(String),
}

/// Persistence contract for calculator state.
/// Implementations decide where the record lives (memory, file, browser storage...).
pub trait StateStore: Send + Sync {
    /// Read the saved state, `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<CalculatorState>, StoreError>;

    /// Replace the saved state
    fn save(&self, state: &CalculatorState) -> Result<(), StoreError>;
}

// ============================================================================
// JSON Codec
// ============================================================================

/// Encode the state as a JSON record
pub fn state_to_json(state: &CalculatorState) -> Result<String, StoreError> {
    Ok(serde_json::to_string(state)?)
}

/// Decode a JSON record into a state.
///
/// Lenient per field: a missing or malformed field keeps its power-on
/// default, so records written by older versions still load. Only text that
/// is not a JSON object is rejected.
pub fn state_from_json(text: &str) -> Result<CalculatorState, StoreError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(record) = value else {
        return Err(StoreError::NotARecord);
    };

    let mut state = CalculatorState::default();
    read_field(&record, "stack", &mut state.stack);
    read_field(&record, "display", &mut state.display);
    read_field(&record, "lastX", &mut state.last_x);
    read_field(&record, "modifiers", &mut state.modifier);
    read_field(&record, "powerOn", &mut state.power_on);
    read_field(&record, "financial", &mut state.financial);
    read_field(&record, "error", &mut state.error);
    read_field(&record, "memory", &mut state.memory);
    read_field(&record, "stats", &mut state.stats);
    read_field(&record, "pendingOp", &mut state.pending);
    read_field(&record, "begMode", &mut state.beg_mode);
    read_field(&record, "dateFormat", &mut state.date_format);
    read_field(&record, "decimals", &mut state.decimals);
    read_field(&record, "displayFormat", &mut state.display_format);
    state.decimals = state.decimals.min(MAX_DECIMALS);

    let mut buffer: Option<String> = None;
    read_field(&record, "inputBuffer", &mut buffer);
    state.input_buffer = buffer.as_deref().and_then(EntryBuffer::from_partial);

    let mut flows: Vec<CashFlow> = Vec::new();
    read_field(&record, "cashFlows", &mut flows);
    state.cash_flows = flows
        .into_iter()
        .map(|flow| CashFlow {
            count: flow.count.clamp(MIN_REPEAT, MAX_REPEAT),
            ..flow
        })
        .collect::<CashFlowLedger>();

    Ok(state)
}

fn read_field<T: DeserializeOwned>(record: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = record.get(key) else {
        return;
    };
    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(error) => {
            tracing::warn!(field = key, %error, "Malformed persisted field, using default");
        }
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Holds the JSON record in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    record: Mutex<Option<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record, e.g. one read from elsewhere
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    /// Current raw record
    pub fn record(&self) -> Option<String> {
        self.record.lock().clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<CalculatorState>, StoreError> {
        match self.record.lock().as_deref() {
            Some(text) => state_from_json(text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, state: &CalculatorState) -> Result<(), StoreError> {
        let json = state_to_json(state)?;
        *self.record.lock() = Some(json);
        Ok(())
    }
}
