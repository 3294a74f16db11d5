use serde::{Deserialize, Serialize};

use crate::on_error::StorageFault;

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub schema_version: u32,   // 1
    pub generated_at: String,  // rfc3339
    pub formwright_version: String,
    pub platform: PlatformInfo,

    pub storage: StorageSummary,
    pub schema: Option<SchemaSummary>,
    pub responses: Option<ResponsesSummary>,

    pub issues: Vec<Issue>,
    pub faults: Vec<StorageFault>,
}

impl DoctorReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSummary {
    pub backend: String,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub field_count: u32,
    pub type_counts: std::collections::BTreeMap<String, u32>,
    pub required_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesSummary {
    pub record_count: u32,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
}

pub mod codes {
    pub const E_STORAGE_UNAVAILABLE: &str = "E_STORAGE_UNAVAILABLE";
    pub const E_BLOB_UNREADABLE: &str = "E_BLOB_UNREADABLE";
    pub const E_DUPLICATE_ID: &str = "E_DUPLICATE_ID";
    pub const E_EMPTY_OPTIONS: &str = "E_EMPTY_OPTIONS";
    pub const E_DEFAULT_NOT_IN_OPTIONS: &str = "E_DEFAULT_NOT_IN_OPTIONS";
    pub const W_ORPHAN_RESPONSE_KEYS: &str = "W_ORPHAN_RESPONSE_KEYS";
    pub const I_NOT_PERSISTED: &str = "I_NOT_PERSISTED";
}
