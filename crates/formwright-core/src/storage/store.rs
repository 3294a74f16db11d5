use crate::errors::StorageError;
use crate::on_error::{FaultLog, FaultOp, StorageFault};
use crate::storage::backend::{BlobBackend, MemoryBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// JSON get/set over a blob backend.
///
/// `try_get`/`try_set`/`try_remove` expose the fault as a `Result`.
/// `get`/`set`/`remove` are what the stores call: they record the fault,
/// log it and carry on with the fallback, so a broken backend never blocks
/// startup or a mutation.
#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn BlobBackend>,
    faults: Arc<FaultLog>,
    open_failure: Option<StorageFault>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("backend", &self.backend.name())
            .field("faults", &self.faults.len())
            .field("degraded", &self.open_failure.is_some())
            .finish()
    }
}

impl Persistence {
    pub fn new(backend: impl BlobBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            faults: Arc::new(FaultLog::new()),
            open_failure: None,
        }
    }

    pub fn from_arc(backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            backend,
            faults: Arc::new(FaultLog::new()),
            open_failure: None,
        }
    }

    /// Non-persistent adapter; state lives as long as this handle.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// In-memory stand-in for a backend at `location` that failed to open.
    /// The failure is recorded and stays visible through [`Self::open_failure`].
    pub fn degraded(location: &str, err: StorageError) -> Self {
        let mut p = Self::in_memory();
        p.faults.record(FaultOp::Open, location, &err);
        p.open_failure = p.faults.snapshot().pop();
        p
    }

    pub fn open_failure(&self) -> Option<&StorageFault> {
        self.open_failure.as_ref()
    }

    /// True when nothing written through this handle outlives the process.
    pub fn is_degraded(&self) -> bool {
        self.open_failure.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// `Ok(None)` on a missing key. An empty or whitespace-only blob counts
    /// as missing.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = match self.backend.read(key)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(None),
        };
        let value = serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &raw)
    }

    pub fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }

    /// Reads `key`, returning `fallback` when it is missing or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!(key = %key, "no stored value, using fallback");
                fallback
            }
            Err(e) => {
                self.faults.record(FaultOp::Get, key, &e);
                fallback
            }
        }
    }

    /// Writes `value` under `key`. Returns whether the write landed; a
    /// failed write is recorded and otherwise ignored.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                self.faults.record(FaultOp::Set, key, &e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(e) => {
                self.faults.record(FaultOp::Remove, key, &e);
                false
            }
        }
    }

    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.backend.keys()
    }

    pub fn faults(&self) -> Vec<StorageFault> {
        self.faults.snapshot()
    }

    pub fn fault_count(&self) -> usize {
        self.faults.len()
    }
}
