use formwright_core::model::{FieldId, SCHEMA_KEY};
use formwright_core::storage::Persistence;
use formwright_core::{FieldDefinition, FieldType, SchemaStore};
use std::collections::HashSet;

/// Small deterministic LCG so the op sequence is reproducible without
/// pulling in a property-testing crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

#[test]
fn test_random_add_delete_reorder_keeps_ids_unique_and_exact() {
    for seed in 0..20u64 {
        let mut rng = Lcg(seed);
        let mut store = SchemaStore::load(Persistence::in_memory());
        // Model of what the sequence should be, tracked by id only.
        let mut expected: Vec<FieldId> = Vec::new();

        for _ in 0..200 {
            match rng.next(4) {
                0 | 1 => {
                    let t = FieldType::ALL[rng.next(FieldType::ALL.len())];
                    let id = store.add_field(t).id.clone();
                    expected.push(id);
                }
                2 => {
                    if expected.is_empty() {
                        assert!(!store.delete_field(&FieldId::from("ghost")));
                        continue;
                    }
                    let idx = rng.next(expected.len());
                    let id = expected.remove(idx);
                    assert!(store.delete_field(&id));
                    // Second delete of the same id is a no-op.
                    assert!(!store.delete_field(&id));
                }
                _ => {
                    if expected.is_empty() {
                        continue;
                    }
                    let from = rng.next(expected.len());
                    let to = rng.next(expected.len());
                    store.reorder_field(from, to).unwrap();
                    let moved = expected.remove(from);
                    expected.insert(to, moved);
                }
            }

            let ids: Vec<FieldId> = store.fields().iter().map(|f| f.id.clone()).collect();
            assert_eq!(ids, expected, "seed {seed}");
            let unique: HashSet<&FieldId> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len(), "seed {seed}");
        }
    }
}

#[test]
fn test_reorder_same_index_is_noop() {
    let mut store = SchemaStore::load(Persistence::in_memory());
    for t in FieldType::ALL {
        store.add_field(t);
    }
    let before = store.fields().to_vec();
    for i in 0..before.len() {
        store.reorder_field(i, i).unwrap();
        assert_eq!(store.fields(), before.as_slice());
    }
}

#[test]
fn test_reorder_moves_forward_and_backward() {
    let mut store = SchemaStore::load(Persistence::in_memory());
    let ids: Vec<FieldId> = (0..4)
        .map(|_| store.add_field(FieldType::Text).id.clone())
        .collect();

    store.reorder_field(0, 3).unwrap();
    let now: Vec<&FieldId> = store.fields().iter().map(|f| &f.id).collect();
    assert_eq!(now, [&ids[1], &ids[2], &ids[3], &ids[0]]);

    store.reorder_field(3, 0).unwrap();
    let now: Vec<&FieldId> = store.fields().iter().map(|f| &f.id).collect();
    assert_eq!(now, [&ids[0], &ids[1], &ids[2], &ids[3]]);
}

#[test]
fn test_duplicate_copies_everything_but_id_and_label() {
    let mut store = SchemaStore::load(Persistence::in_memory());
    let src = store.add_field(FieldType::Dropdown).id.clone();
    store.add_field(FieldType::Title);
    let len = store.len();

    let copy_id = store.duplicate_field(&src).unwrap();
    assert_eq!(store.len(), len + 1);
    assert_ne!(copy_id, src);

    let original = store.get(&src).unwrap().clone();
    let copy = store.fields().last().unwrap().clone();
    assert_eq!(copy.id, copy_id);
    assert_eq!(copy.label, format!("{} (copy)", original.label));
    assert_eq!(
        FieldDefinition {
            id: original.id.clone(),
            label: original.label.clone(),
            ..copy
        },
        original
    );

    assert_eq!(store.duplicate_field(&FieldId::from("gone")), None);
    assert_eq!(store.len(), len + 1);
}

#[test]
fn test_every_mutation_is_written_through() {
    let p = Persistence::in_memory();
    let mut store = SchemaStore::load(p.clone());
    let a = store.add_field(FieldType::Text).id.clone();
    store.add_field(FieldType::Radio);
    store.duplicate_field(&a);
    store.reorder_field(2, 0).unwrap();
    store.delete_field(&a);

    let stored: Vec<FieldDefinition> = p.get(SCHEMA_KEY, vec![]);
    assert_eq!(stored.as_slice(), store.fields());
}
