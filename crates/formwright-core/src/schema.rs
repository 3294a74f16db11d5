use crate::errors::FieldError;
use crate::model::{FieldDefinition, FieldId, FieldKind, FieldPatch, FieldType, SCHEMA_KEY};
use crate::storage::Persistence;

/// Owns the ordered field definitions of one form.
///
/// Every successful mutation is written through to the adapter. Operations
/// addressed at an id that is not in the schema do nothing and report that
/// through their return value.
#[derive(Debug)]
pub struct SchemaStore {
    fields: Vec<FieldDefinition>,
    selected: Option<FieldId>,
    persistence: Persistence,
}

impl SchemaStore {
    /// Reads the persisted schema once; an absent or unreadable blob gives an
    /// empty schema.
    pub fn load(persistence: Persistence) -> Self {
        let fields: Vec<FieldDefinition> = persistence.get(SCHEMA_KEY, Vec::new());
        tracing::debug!(fields = fields.len(), "schema loaded");
        Self {
            fields,
            selected: None,
            persistence,
        }
    }

    /// Replaces whatever is stored with `fields`.
    pub fn with_fields(persistence: Persistence, fields: Vec<FieldDefinition>) -> Self {
        let store = Self {
            fields,
            selected: None,
            persistence,
        };
        store.persist();
        store
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    pub fn selected(&self) -> Option<&FieldDefinition> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&FieldId> {
        self.selected.as_ref()
    }

    /// Appends a field with the type defaults and selects it.
    pub fn add_field(&mut self, field_type: FieldType) -> &FieldDefinition {
        let field = FieldDefinition::new(field_type);
        tracing::debug!(id = %field.id, field_type = %field_type, "field added");
        self.selected = Some(field.id.clone());
        self.fields.push(field);
        self.persist();
        &self.fields[self.fields.len() - 1]
    }

    /// Returns whether a field was removed.
    pub fn delete_field(&mut self, id: &FieldId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.fields.remove(idx);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.persist();
        true
    }

    /// Appends a copy of `id` under a fresh id; returns the new id.
    pub fn duplicate_field(&mut self, id: &FieldId) -> Option<FieldId> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        copy.id = FieldId::generate();
        copy.label = format!("{} (copy)", source.label);
        let new_id = copy.id.clone();
        self.fields.push(copy);
        self.persist();
        Some(new_id)
    }

    /// Moves the field at `from` so that it ends up at `to`.
    pub fn reorder_field(&mut self, from: usize, to: usize) -> Result<(), FieldError> {
        let len = self.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FieldError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let moved = self.fields.remove(from);
        self.fields.insert(to, moved);
        self.persist();
        Ok(())
    }

    /// Merges `patch` into the field it names. `Ok(false)` when the id is
    /// unknown. A patch that would break the field's invariants is rejected
    /// whole.
    pub fn update_field(&mut self, patch: &FieldPatch) -> Result<bool, FieldError> {
        let Some(idx) = self.position(&patch.id) else {
            return Ok(false);
        };
        let mut next = self.fields[idx].clone();
        apply_patch(&mut next, patch)?;
        if next != self.fields[idx] {
            self.fields[idx] = next;
            self.persist();
        }
        Ok(true)
    }

    /// Returns whether `id` exists; selection is only changed if it does.
    pub fn select_field(&mut self, id: &FieldId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Appends `Option N+1` to a dropdown or radio field.
    pub fn add_option(&mut self, id: &FieldId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let Some(options) = self.fields[idx].kind.options_mut() else {
            return false;
        };
        options.push(format!("Option {}", options.len() + 1));
        self.persist();
        true
    }

    pub fn update_option(
        &mut self,
        id: &FieldId,
        index: usize,
        value: impl Into<String>,
    ) -> Result<bool, FieldError> {
        let Some(options) = self.get(id).and_then(|f| f.kind.options()) else {
            return Ok(false);
        };
        if index >= options.len() {
            return Err(FieldError::OptionOutOfRange {
                index,
                len: options.len(),
            });
        }
        let mut options = options.to_vec();
        options[index] = value.into();
        self.update_field(&FieldPatch {
            options: Some(options),
            ..FieldPatch::new(id.clone())
        })
    }

    pub fn remove_option(&mut self, id: &FieldId, index: usize) -> Result<bool, FieldError> {
        let Some(options) = self.get(id).and_then(|f| f.kind.options()) else {
            return Ok(false);
        };
        if index >= options.len() {
            return Err(FieldError::OptionOutOfRange {
                index,
                len: options.len(),
            });
        }
        let mut options = options.to_vec();
        options.remove(index);
        self.update_field(&FieldPatch {
            options: Some(options),
            ..FieldPatch::new(id.clone())
        })
    }

    fn persist(&self) {
        self.persistence.set(SCHEMA_KEY, &self.fields);
    }
}

fn apply_patch(field: &mut FieldDefinition, patch: &FieldPatch) -> Result<(), FieldError> {
    if let Some(label) = &patch.label {
        field.label = label.clone();
    }
    if let Some(required) = patch.required {
        field.required = required;
    }

    let id = field.id.to_string();
    match &mut field.kind {
        FieldKind::Title => {}
        FieldKind::Text {
            placeholder,
            input_type,
        } => {
            if let Some(p) = &patch.placeholder {
                *placeholder = p.clone();
            }
            if let Some(t) = patch.input_type {
                *input_type = t;
            }
        }
        FieldKind::Checkbox { default_value } => {
            if let Some(v) = &patch.default_value {
                *default_value = v.as_bool().ok_or_else(|| FieldError::DefaultWrongShape {
                    id: id.clone(),
                    expected: "boolean",
                })?;
            }
        }
        FieldKind::Dropdown {
            options,
            default_value,
        } => {
            patch_choices(&id, options, default_value, patch, true)?;
        }
        FieldKind::Radio {
            options,
            default_value,
        } => {
            patch_choices(&id, options, default_value, patch, false)?;
        }
    }
    Ok(())
}

fn patch_choices(
    id: &str,
    options: &mut Vec<String>,
    default_value: &mut Option<String>,
    patch: &FieldPatch,
    default_must_be_option: bool,
) -> Result<(), FieldError> {
    if let Some(next) = &patch.options {
        if next.is_empty() {
            return Err(FieldError::EmptyOptions(id.to_string()));
        }
        *options = next.clone();
    }

    match &patch.default_value {
        Some(serde_json::Value::Null) => *default_value = None,
        Some(serde_json::Value::String(s)) if s.is_empty() => *default_value = None,
        Some(serde_json::Value::String(s)) => {
            if default_must_be_option && !options.contains(s) {
                return Err(FieldError::DefaultNotInOptions {
                    id: id.to_string(),
                    value: s.clone(),
                });
            }
            *default_value = Some(s.clone());
        }
        Some(_) => {
            return Err(FieldError::DefaultWrongShape {
                id: id.to_string(),
                expected: "string",
            })
        }
        None => {
            // Renamed or removed options can orphan the current default.
            if default_must_be_option {
                if let Some(current) = default_value.as_ref() {
                    if !options.contains(current) {
                        *default_value = None;
                    }
                }
            }
        }
    }
    Ok(())
}
