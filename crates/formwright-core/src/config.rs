use crate::errors::{ConfigError, StorageError};
use crate::storage::{FileBackend, Persistence, SqliteBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "formwright.yaml";
pub const DEFAULT_DB_PATH: &str = ".formwright/form.db";

pub const ENV_DB: &str = "FORMWRIGHT_DB";
pub const ENV_LOG: &str = "FORMWRIGHT_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormwrightConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for FormwrightConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            storage: StorageConfig::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::File => "file",
            BackendKind::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// SQLite database file, or directory for the file backend.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl StorageConfig {
    /// Opens the configured backend. If it cannot be opened the adapter
    /// degrades to an in-memory store that carries the open failure, so the
    /// builder stays usable and `doctor` can still report the loss.
    pub fn open(&self) -> Persistence {
        let opened = match self.backend {
            BackendKind::Sqlite => SqliteBackend::open(&self.path).map(Persistence::new),
            BackendKind::File => FileBackend::open(&self.path).map(Persistence::new),
            BackendKind::Memory => Ok(Persistence::in_memory()),
        };
        match opened {
            Ok(p) => {
                tracing::debug!(backend = p.backend_name(), path = %self.path.display(), "storage opened");
                p
            }
            Err(e) => {
                let location = self.path.display().to_string();
                Persistence::degraded(
                    &location,
                    StorageError::Unavailable(format!(
                        "{} backend at {}: {:#}",
                        self.backend.as_str(),
                        location,
                        e
                    )),
                )
            }
        }
    }
}

/// Loads `path`; a missing file yields the defaults. With `strict`, unknown
/// keys are an error instead of a warning.
pub fn load_config(path: &Path, strict: bool) -> Result<FormwrightConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(FormwrightConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::BTreeSet::new();
    let mut cfg: FormwrightConfig = if raw.trim().is_empty() {
        FormwrightConfig::default()
    } else {
        let deserializer = serde_yaml::Deserializer::from_str(&raw);
        serde_ignored::deserialize(deserializer, |p| {
            ignored_keys.insert(p.to_string());
        })
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?
    };

    // Keys starting with "x-" or "_" are reserved for anchors and notes.
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                meaningful_unknowns,
                path.display()
            )));
        }
        tracing::warn!(unknown = ?meaningful_unknowns, "ignored unknown config fields");
    }

    if cfg.version == 0 {
        cfg.version = SUPPORTED_CONFIG_VERSION;
    }
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    normalize_paths(&mut cfg, path);
    Ok(cfg)
}

/// Relative storage paths are taken relative to the config file.
fn normalize_paths(cfg: &mut FormwrightConfig, config_path: &Path) {
    if cfg.storage.path.is_relative() {
        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            cfg.storage.path = dir.join(&cfg.storage.path);
        }
    }
}

/// Environment wins over the file.
pub fn apply_env(cfg: &mut FormwrightConfig) {
    if let Ok(v) = std::env::var(ENV_DB) {
        if !v.trim().is_empty() {
            cfg.storage.path = PathBuf::from(v);
        }
    }
    if let Ok(v) = std::env::var(ENV_LOG) {
        if !v.trim().is_empty() {
            cfg.log_level = v;
        }
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"configVersion: 1
# sqlite | file | memory
storage:
  backend: sqlite
  path: .formwright/form.db
log_level: warn
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = load_config(Path::new("/definitely/not/here.yaml"), true).unwrap();
        assert_eq!(cfg, FormwrightConfig::default());
    }

    #[test]
    fn test_strict_rejects_unknown_keys() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "configVersion: 1\nstorage:\n  backend: file\n  colour: blue\n").unwrap();
        let err = load_config(tmp.path(), true).unwrap_err();
        assert!(err.to_string().contains("storage.colour"));

        let cfg = load_config(tmp.path(), false).unwrap();
        assert_eq!(cfg.storage.backend, BackendKind::File);
    }

    #[test]
    fn test_relative_path_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formwright.yaml");
        std::fs::write(&path, "storage:\n  path: data/forms.db\n").unwrap();
        let cfg = load_config(&path, true).unwrap();
        assert_eq!(cfg.storage.path, dir.path().join("data/forms.db"));
        assert_eq!(cfg.version, SUPPORTED_CONFIG_VERSION);
    }

    #[test]
    fn test_unsupported_version() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "configVersion: 7").unwrap();
        let err = load_config(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("unsupported config version 7"));
    }

    #[test]
    fn test_sample_config_loads_strictly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path, true).unwrap();
        assert_eq!(cfg.storage.backend, BackendKind::Sqlite);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_unopenable_storage_degrades_to_memory() {
        let file = NamedTempFile::new().unwrap();
        // A regular file cannot be used as the file backend's directory.
        let storage = StorageConfig {
            backend: BackendKind::File,
            path: file.path().join("nested"),
        };
        let p = storage.open();
        assert_eq!(p.backend_name(), "memory");
        assert!(p.is_degraded());
        let fault = p.open_failure().unwrap();
        assert!(fault.message.contains("file backend at"));
        assert!(fault.message.contains("nested"));

        let fine = StorageConfig {
            backend: BackendKind::Memory,
            path: file.path().to_path_buf(),
        };
        assert!(!fine.open().is_degraded());
    }
}
