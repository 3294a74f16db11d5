use formwright_core::model::{ResponseRecord, RESPONSES_KEY, SCHEMA_KEY};
use formwright_core::storage::{FileBackend, Persistence, SqliteBackend};
use formwright_core::{FieldType, FormBuilder, SubmitOutcome};
use tempfile::tempdir;

#[test]
fn test_storage_smoke_sqlite_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("form.db");

    // 1. Build a form and submit once
    let name_id = {
        let mut builder = FormBuilder::open(Persistence::new(SqliteBackend::open(&db_path)?));
        builder.add_field(FieldType::Title);
        let name = builder.add_field(FieldType::Text);
        builder.set_value(name.clone(), serde_json::json!("Ada"));
        assert_eq!(builder.submit(), SubmitOutcome::Accepted { total: 1 });
        name
    };

    // 2. Reopen: both blobs survive the session
    let builder = FormBuilder::open(Persistence::new(SqliteBackend::open(&db_path)?));
    assert_eq!(builder.fields().len(), 2);
    assert_eq!(builder.fields()[1].id, name_id);
    assert_eq!(builder.responses().len(), 1);
    assert_eq!(builder.responses()[0].data[&name_id], "Ada");

    // 3. Verify via raw SQL that exactly the two namespaced keys exist
    let conn = rusqlite::Connection::open(&db_path)?;
    let mut stmt = conn.prepare("SELECT key FROM blobs ORDER BY key")?;
    let keys: Vec<String> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<Result<_, _>>()?;
    assert_eq!(keys, vec![SCHEMA_KEY.to_string(), RESPONSES_KEY.to_string()]);

    Ok(())
}

#[test]
fn test_storage_smoke_file_backend_blobs_are_plain_json_arrays() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let p = Persistence::new(FileBackend::open(dir.path())?);

    let mut builder = FormBuilder::open(p.clone());
    builder.add_field(FieldType::Checkbox);
    assert!(builder.submit().is_accepted());

    let raw = std::fs::read_to_string(dir.path().join("formBuilderSchema.json"))?;
    let schema: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(schema.as_array().map(|a| a.len()), Some(1));
    assert_eq!(schema[0]["type"], "checkbox");
    assert_eq!(schema[0]["defaultValue"], false);

    let raw = std::fs::read_to_string(dir.path().join("formResponses.json"))?;
    let records: Vec<ResponseRecord> = serde_json::from_str(&raw)?;
    assert_eq!(records.len(), 1);
    assert!(records[0].timestamp > 0);
    Ok(())
}

#[test]
fn test_roundtrip_set_then_get_is_structurally_equal() {
    let p = Persistence::new(SqliteBackend::memory().unwrap());
    let arr = serde_json::json!([
        {"timestamp": 1, "data": {"a": "x", "b": true}},
        {"timestamp": 2, "data": {}}
    ]);
    assert!(p.set("formResponses", &arr));
    let back: serde_json::Value = p.get("formResponses", serde_json::json!([]));
    assert_eq!(back, arr);
}

#[test]
fn test_clear_then_get_returns_empty() {
    let p = Persistence::in_memory();
    let mut builder = FormBuilder::open(p.clone());
    builder.add_field(FieldType::Text);
    builder.submit();
    builder.submit();
    assert_eq!(builder.responses().len(), 2);

    builder.clear_responses();
    let stored: Vec<ResponseRecord> = p.get(RESPONSES_KEY, vec![]);
    assert!(stored.is_empty());
    assert!(builder.responses().is_empty());
}
