use formwright_core::model::{FieldKind, InputType, SCHEMA_KEY};
use formwright_core::storage::{BlobBackend, MemoryBackend, Persistence};
use formwright_core::{FieldType, FormBuilder, SchemaStore};

/// A schema blob exactly as the browser build wrote it: no `inputType`,
/// optional keys simply absent.
const LEGACY_SCHEMA: &str = r#"[
  {"id":"5b1c","type":"title","label":"Untitled Form","required":false},
  {"id":"77aa","type":"text","label":"Your Name","placeholder":"Enter your name","required":true},
  {"id":"9f02","type":"dropdown","label":"Country","options":["India","USA","UK"],"defaultValue":"India","required":false},
  {"id":"c3d4","type":"checkbox","label":"Subscribe","required":false},
  {"id":"e5f6","type":"radio","label":"Size","options":["S","M","L"],"defaultValue":"S"}
]"#;

#[test]
fn test_compat_legacy_schema_loads() {
    let backend = MemoryBackend::new();
    backend.write(SCHEMA_KEY, LEGACY_SCHEMA).unwrap();
    let p = Persistence::new(backend);

    let store = SchemaStore::load(p.clone());
    assert_eq!(store.len(), 5);
    assert_eq!(p.fault_count(), 0);

    let types: Vec<FieldType> = store.fields().iter().map(|f| f.field_type()).collect();
    assert_eq!(
        types,
        [
            FieldType::Title,
            FieldType::Text,
            FieldType::Dropdown,
            FieldType::Checkbox,
            FieldType::Radio
        ]
    );
    assert!(matches!(
        store.fields()[1].kind,
        FieldKind::Text {
            input_type: InputType::Plain,
            ..
        }
    ));
    assert_eq!(
        store.fields()[3].kind,
        FieldKind::Checkbox {
            default_value: false
        }
    );
    assert!(!store.fields()[4].required);
}

#[test]
fn test_compat_unknown_keys_are_ignored() {
    let backend = MemoryBackend::new();
    backend
        .write(
            SCHEMA_KEY,
            r#"[{"id":"a","type":"text","label":"L","required":false,"futureKey":42}]"#,
        )
        .unwrap();
    let store = SchemaStore::load(Persistence::new(backend));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_compat_unknown_type_falls_back_to_empty_schema() {
    let backend = MemoryBackend::new();
    backend
        .write(
            SCHEMA_KEY,
            r#"[{"id":"a","type":"slider","label":"L","required":false}]"#,
        )
        .unwrap();
    let p = Persistence::new(backend);
    let store = SchemaStore::load(p.clone());
    assert!(store.is_empty());
    assert_eq!(p.fault_count(), 1);
}

#[test]
fn test_compat_written_shape_reloads_identically() {
    let p = Persistence::in_memory();
    let mut builder = FormBuilder::open(p.clone());
    for t in FieldType::ALL {
        builder.add_field(t);
    }
    let written = builder.fields().to_vec();

    let reloaded = SchemaStore::load(p);
    assert_eq!(reloaded.fields(), written.as_slice());
}
