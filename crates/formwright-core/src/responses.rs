use crate::model::{FormData, ResponseRecord, RESPONSES_KEY};
use crate::storage::Persistence;

/// Append-only log of submitted responses.
#[derive(Debug)]
pub struct ResponseStore {
    records: Vec<ResponseRecord>,
    persistence: Persistence,
}

impl ResponseStore {
    pub fn load(persistence: Persistence) -> Self {
        let records: Vec<ResponseRecord> = persistence.get(RESPONSES_KEY, Vec::new());
        tracing::debug!(records = records.len(), "responses loaded");
        Self {
            records,
            persistence,
        }
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a copy of `data` stamped with the current time. Callers
    /// validate first; nothing is re-checked here.
    pub fn submit(&mut self, data: &FormData) {
        self.submit_at(data, chrono::Utc::now().timestamp_millis());
    }

    pub fn submit_at(&mut self, data: &FormData, timestamp: i64) {
        self.records.push(ResponseRecord {
            timestamp,
            data: data.clone(),
        });
        tracing::info!(
            event = "formwright.response.submitted",
            total = self.records.len(),
            fields = data.len()
        );
        self.persist();
    }

    /// Drops every record. Irreversible.
    pub fn clear(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        tracing::info!(event = "formwright.response.cleared", dropped);
        self.persist();
    }

    fn persist(&self) {
        self.persistence.set(RESPONSES_KEY, &self.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldId;

    #[test]
    fn test_submit_copies_data_and_persists() {
        let p = Persistence::in_memory();
        let mut store = ResponseStore::load(p.clone());

        let mut data = FormData::new();
        data.insert(FieldId::from("name"), serde_json::json!("Ada"));
        store.submit_at(&data, 1_700_000_000_000);
        data.insert(FieldId::from("name"), serde_json::json!("changed"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].data[&FieldId::from("name")], "Ada");

        let reloaded = ResponseStore::load(p);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_clear_empties_log() {
        let p = Persistence::in_memory();
        let mut store = ResponseStore::load(p.clone());
        store.submit(&FormData::new());
        store.submit(&FormData::new());
        store.clear();
        assert!(store.is_empty());
        let stored: Vec<ResponseRecord> = p.get(RESPONSES_KEY, vec![]);
        assert!(stored.is_empty());
    }
}
