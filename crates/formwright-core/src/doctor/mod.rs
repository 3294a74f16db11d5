pub mod model;

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FieldDefinition, FieldKind, ResponseRecord, RESPONSES_KEY, SCHEMA_KEY};
use crate::storage::Persistence;

use model::*;

/// Inspects what is actually stored. Unlike the stores, which silently fall
/// back to empty state, this reports unreadable blobs and broken invariants.
pub fn doctor(persistence: &Persistence) -> DoctorReport {
    let mut issues = Vec::new();

    if let Some(fault) = persistence.open_failure() {
        issues.push(issue(
            codes::E_STORAGE_UNAVAILABLE,
            Severity::Error,
            format!("{} (nothing is being saved)", fault.message),
            None,
        ));
    }

    let keys = match persistence.keys() {
        Ok(keys) => keys,
        Err(e) => {
            issues.push(issue(
                codes::E_BLOB_UNREADABLE,
                Severity::Error,
                format!("cannot list stored keys: {}", e),
                None,
            ));
            vec![]
        }
    };

    let fields = read_blob::<Vec<FieldDefinition>>(persistence, SCHEMA_KEY, &mut issues);
    let records = read_blob::<Vec<ResponseRecord>>(persistence, RESPONSES_KEY, &mut issues);

    if let Some(fields) = &fields {
        check_fields(fields, &mut issues);
        if let Some(records) = &records {
            check_orphans(fields, records, &mut issues);
        }
    }

    DoctorReport {
        schema_version: 1,
        generated_at: Utc::now().to_rfc3339(),
        formwright_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        storage: StorageSummary {
            backend: persistence.backend_name().to_string(),
            keys,
        },
        schema: fields.as_deref().map(summarize_schema),
        responses: records.as_deref().map(summarize_responses),
        issues,
        faults: persistence.faults(),
    }
}

fn read_blob<T: serde::de::DeserializeOwned>(
    persistence: &Persistence,
    key: &str,
    issues: &mut Vec<Issue>,
) -> Option<T> {
    match persistence.try_get::<T>(key) {
        Ok(Some(v)) => Some(v),
        Ok(None) => {
            issues.push(issue(
                codes::I_NOT_PERSISTED,
                Severity::Info,
                format!("nothing stored under '{}' yet", key),
                None,
            ));
            None
        }
        Err(e) => {
            issues.push(issue(
                codes::E_BLOB_UNREADABLE,
                Severity::Error,
                format!("{} (the app will start from an empty value)", e),
                None,
            ));
            None
        }
    }
}

fn check_fields(fields: &[FieldDefinition], issues: &mut Vec<Issue>) {
    let mut seen = BTreeSet::new();
    for f in fields {
        if !seen.insert(&f.id) {
            issues.push(issue(
                codes::E_DUPLICATE_ID,
                Severity::Error,
                format!("field id '{}' appears more than once", f.id),
                Some(f.id.to_string()),
            ));
        }

        if f.kind.options().is_some_and(|o| o.is_empty()) {
            issues.push(issue(
                codes::E_EMPTY_OPTIONS,
                Severity::Error,
                format!("{} field '{}' has no options", f.field_type(), f.label),
                Some(f.id.to_string()),
            ));
        }

        if let FieldKind::Dropdown {
            options,
            default_value: Some(d),
        } = &f.kind
        {
            if !options.contains(d) {
                issues.push(issue(
                    codes::E_DEFAULT_NOT_IN_OPTIONS,
                    Severity::Error,
                    format!("dropdown '{}' defaults to '{}' which is not an option", f.label, d),
                    Some(f.id.to_string()),
                ));
            }
        }
    }
}

fn check_orphans(fields: &[FieldDefinition], records: &[ResponseRecord], issues: &mut Vec<Issue>) {
    let known: BTreeSet<_> = fields.iter().map(|f| &f.id).collect();
    let orphans: BTreeSet<_> = records
        .iter()
        .flat_map(|r| r.data.keys())
        .filter(|k| !known.contains(k))
        .collect();
    if !orphans.is_empty() {
        issues.push(issue(
            codes::W_ORPHAN_RESPONSE_KEYS,
            Severity::Warn,
            format!(
                "{} response value key(s) belong to deleted fields and are not shown",
                orphans.len()
            ),
            None,
        ));
    }
}

fn summarize_schema(fields: &[FieldDefinition]) -> SchemaSummary {
    let mut type_counts = BTreeMap::new();
    for f in fields {
        *type_counts.entry(f.field_type().to_string()).or_insert(0) += 1;
    }
    SchemaSummary {
        field_count: fields.len() as u32,
        type_counts,
        required_count: fields.iter().filter(|f| f.required && !f.is_title()).count() as u32,
    }
}

fn summarize_responses(records: &[ResponseRecord]) -> ResponsesSummary {
    ResponsesSummary {
        record_count: records.len() as u32,
        first_timestamp: records.first().map(|r| r.timestamp),
        last_timestamp: records.last().map(|r| r.timestamp),
    }
}

fn issue(code: &str, severity: Severity, message: String, field_id: Option<String>) -> Issue {
    Issue {
        code: code.to_string(),
        severity,
        message,
        field_id,
    }
}
