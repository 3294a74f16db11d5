// on_error.rs - Storage fault bookkeeping for Formwright
//
// Persistence faults never reach the user. They are logged and kept in a
// small ring so diagnostics (`formwright doctor`, tests) can inspect them.

use crate::errors::StorageError;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of faults retained for diagnostics.
pub const FAULT_LOG_CAPACITY: usize = 64;

/// Which adapter operation produced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultOp {
    Open,
    Get,
    Set,
    Remove,
}

/// A recorded persistence fault.
#[derive(Debug, Clone, Serialize)]
pub struct StorageFault {
    pub op: FaultOp,
    pub key: String,
    pub kind: &'static str,
    pub message: String,
    /// Epoch milliseconds.
    pub at: i64,
}

#[derive(Debug, Default)]
pub struct FaultLog {
    entries: Mutex<VecDeque<StorageFault>>,
}

impl FaultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the fault and keeps it, evicting the oldest entry once full.
    pub fn record(&self, op: FaultOp, key: &str, err: &StorageError) {
        log_storage_fault(op, key, err);
        let fault = StorageFault {
            op,
            key: key.to_string(),
            kind: err.kind(),
            message: err.to_string(),
            at: chrono::Utc::now().timestamp_millis(),
        };
        // A poisoned lock only loses diagnostics.
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == FAULT_LOG_CAPACITY {
                entries.pop_front();
            }
            entries.push_back(fault);
        }
    }

    pub fn snapshot(&self) -> Vec<StorageFault> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Emits a structured warning so the binary can route it wherever its
/// subscriber points.
pub fn log_storage_fault(op: FaultOp, key: &str, err: &StorageError) {
    tracing::warn!(
        event = "formwright.storage.fault",
        op = ?op,
        key = %key,
        kind = err.kind(),
        action = "degraded",
        "Storage fault swallowed: {}", err
    );
}
