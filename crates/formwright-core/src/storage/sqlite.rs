use crate::errors::StorageError;
use crate::storage::backend::BlobBackend;
use anyhow::Context;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Blob storage in a single SQLite table.
#[derive(Clone)]
pub struct SqliteBackend {
    pub conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        let backend = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        backend.init_schema()?;
        Ok(backend)
    }

    pub fn memory() -> anyhow::Result<Self> {
        // SQLite in-memory DB
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        let backend = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        backend.init_schema()?;
        Ok(backend)
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("sqlite connection lock poisoned".into()))
    }
}

impl BlobBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let read_err = |e: rusqlite::Error| StorageError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT value_json FROM blobs WHERE key=?1")
            .map_err(read_err)?;
        let mut rows = stmt.query(params![key]).map_err(read_err)?;
        let value = match rows.next().map_err(read_err)? {
            Some(row) => Some(row.get::<_, String>(0).map_err(read_err)?),
            None => None,
        };
        Ok(value)
    }

    fn write(&self, key: &str, raw: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO blobs(key, value_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value_json=excluded.value_json,
                updated_at=excluded.updated_at",
            params![key, raw, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM blobs WHERE key=?1", params![key])
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let read_err = |e: rusqlite::Error| StorageError::Read {
            key: "*".into(),
            reason: e.to_string(),
        };
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key FROM blobs ORDER BY key")
            .map_err(read_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(read_err)?;

        let mut keys = Vec::new();
        for r in rows {
            keys.push(r.map_err(read_err)?);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_overwrites() {
        let backend = SqliteBackend::memory().unwrap();
        backend.write("formBuilderSchema", "[]").unwrap();
        backend.write("formBuilderSchema", "[{\"id\":\"a\"}]").unwrap();
        assert_eq!(
            backend.read("formBuilderSchema").unwrap().as_deref(),
            Some("[{\"id\":\"a\"}]")
        );
        assert_eq!(backend.keys().unwrap(), vec!["formBuilderSchema".to_string()]);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let backend = SqliteBackend::memory().unwrap();
        backend.remove("nope").unwrap();
        assert_eq!(backend.read("nope").unwrap(), None);
    }
}
