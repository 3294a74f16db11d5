use crate::errors::FieldError;
use crate::model::{FieldDefinition, FieldId, FieldPatch, FieldType, FormData, ResponseRecord};
use crate::responses::ResponseStore;
use crate::schema::SchemaStore;
use crate::storage::Persistence;
use crate::validate::{validate, ValidationErrorMap};

/// The single owner of one schema store, one response store, the draft
/// values being filled in and the current validation errors.
///
/// Any schema change resets the draft to the schema defaults and drops
/// pending errors, the same way a rendered form re-initialises when its
/// definition changes.
#[derive(Debug)]
pub struct FormBuilder {
    schema: SchemaStore,
    responses: ResponseStore,
    values: FormData,
    errors: ValidationErrorMap,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Appended; carries the new log length.
    Accepted { total: usize },
    /// Nothing appended; the same map is kept as the current errors.
    Rejected(ValidationErrorMap),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Starting values for a fresh form: every field that declares a default.
pub fn initial_values(schema: &[FieldDefinition]) -> FormData {
    schema
        .iter()
        .filter_map(|f| f.kind.default_value().map(|v| (f.id.clone(), v)))
        .collect()
}

impl FormBuilder {
    /// Loads both stores through the same adapter.
    pub fn open(persistence: Persistence) -> Self {
        Self::from_stores(
            SchemaStore::load(persistence.clone()),
            ResponseStore::load(persistence),
        )
    }

    pub fn from_stores(schema: SchemaStore, responses: ResponseStore) -> Self {
        let values = initial_values(schema.fields());
        Self {
            schema,
            responses,
            values,
            errors: ValidationErrorMap::new(),
        }
    }

    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        self.schema.fields()
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        self.responses.records()
    }

    pub fn errors(&self) -> &ValidationErrorMap {
        &self.errors
    }

    pub fn values(&self) -> &FormData {
        &self.values
    }

    /// Records a value and optimistically clears that field's error.
    pub fn set_value(&mut self, id: FieldId, value: serde_json::Value) {
        self.errors.remove(&id);
        self.values.insert(id, value);
    }

    pub fn set_values(&mut self, data: FormData) {
        for (id, value) in data {
            self.set_value(id, value);
        }
    }

    /// Validates the draft; on success appends it and starts a fresh draft.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.errors.clear();
        let errors = validate(self.schema.fields(), &self.values);
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "submit rejected");
            self.errors = errors.clone();
            return SubmitOutcome::Rejected(errors);
        }
        self.responses.submit(&self.values);
        self.reset_draft();
        SubmitOutcome::Accepted {
            total: self.responses.len(),
        }
    }

    pub fn clear_responses(&mut self) {
        self.responses.clear();
    }

    pub fn reset_draft(&mut self) {
        self.values = initial_values(self.schema.fields());
        self.errors.clear();
    }

    pub fn add_field(&mut self, field_type: FieldType) -> FieldId {
        let id = self.schema.add_field(field_type).id.clone();
        self.reset_draft();
        id
    }

    pub fn delete_field(&mut self, id: &FieldId) -> bool {
        self.after_schema_change(|s| s.delete_field(id))
    }

    pub fn duplicate_field(&mut self, id: &FieldId) -> Option<FieldId> {
        let new_id = self.schema.duplicate_field(id);
        if new_id.is_some() {
            self.reset_draft();
        }
        new_id
    }

    pub fn reorder_field(&mut self, from: usize, to: usize) -> Result<(), FieldError> {
        self.schema.reorder_field(from, to)?;
        self.reset_draft();
        Ok(())
    }

    pub fn update_field(&mut self, patch: &FieldPatch) -> Result<bool, FieldError> {
        let hit = self.schema.update_field(patch)?;
        if hit {
            self.reset_draft();
        }
        Ok(hit)
    }

    pub fn select_field(&mut self, id: &FieldId) -> bool {
        self.schema.select_field(id)
    }

    pub fn clear_selection(&mut self) {
        self.schema.clear_selection();
    }

    pub fn selected(&self) -> Option<&FieldDefinition> {
        self.schema.selected()
    }

    pub fn schema_mut(&mut self) -> &mut SchemaStore {
        &mut self.schema
    }

    fn after_schema_change(&mut self, op: impl FnOnce(&mut SchemaStore) -> bool) -> bool {
        let hit = op(&mut self.schema);
        if hit {
            self.reset_draft();
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;
    use serde_json::json;

    #[test]
    fn test_initial_values_follow_defaults() {
        let mut b = FormBuilder::open(Persistence::in_memory());
        let title = b.add_field(FieldType::Title);
        let dd = b.add_field(FieldType::Dropdown);
        let cb = b.add_field(FieldType::Checkbox);
        let txt = b.add_field(FieldType::Text);

        let v = b.values();
        assert!(!v.contains_key(&title));
        assert!(!v.contains_key(&txt));
        assert_eq!(v[&dd], json!("Option 1"));
        assert_eq!(v[&cb], json!(false));
    }

    #[test]
    fn test_set_value_clears_only_that_error() {
        let mut b = FormBuilder::open(Persistence::in_memory());
        let a = b.add_field(FieldType::Text);
        let c = b.add_field(FieldType::Text);
        for id in [&a, &c] {
            let patch = FieldPatch {
                required: Some(true),
                ..FieldPatch::new(id.clone())
            };
            b.update_field(&patch).unwrap();
        }

        assert!(!b.submit().is_accepted());
        assert_eq!(b.errors().len(), 2);

        b.set_value(a.clone(), json!("hello"));
        assert_eq!(b.errors().len(), 1);
        assert_eq!(b.errors().get(&c), Some(&ValidationError::Required));
    }

    #[test]
    fn test_accepted_submit_resets_draft() {
        let mut b = FormBuilder::open(Persistence::in_memory());
        let t = b.add_field(FieldType::Text);
        b.set_value(t.clone(), json!("x"));
        assert_eq!(b.submit(), SubmitOutcome::Accepted { total: 1 });
        assert!(!b.values().contains_key(&t));
        assert_eq!(b.responses()[0].data[&t], json!("x"));
    }
}
