use crate::model::{FieldDefinition, FieldKind, InputType};
use crate::validate::ValidationErrorMap;

/// One line per field, in schema order. The selected field is marked.
pub fn render_schema(fields: &[FieldDefinition], selected: Option<&crate::model::FieldId>) -> String {
    if fields.is_empty() {
        return "No fields yet. Add one with `formwright field add <type>`.\n".to_string();
    }

    let mut out = String::new();
    for (idx, f) in fields.iter().enumerate() {
        let marker = if selected == Some(&f.id) { ">" } else { " " };
        let required = if f.required && !f.is_title() { " *" } else { "" };
        out.push_str(&format!(
            "{} {:>2}. [{:<8}] {}{}  ({})\n",
            marker,
            idx,
            f.field_type().as_str(),
            f.label,
            required,
            f.id
        ));
        if let Some(detail) = describe_kind(&f.kind) {
            out.push_str(&format!("        {}\n", detail));
        }
    }
    out
}

fn describe_kind(kind: &FieldKind) -> Option<String> {
    match kind {
        FieldKind::Title => None,
        FieldKind::Text {
            placeholder,
            input_type,
        } => {
            let mut parts = Vec::new();
            if *input_type != InputType::Plain {
                parts.push(format!("input: {:?}", input_type).to_lowercase());
            }
            if let Some(p) = placeholder {
                parts.push(format!("placeholder: \"{}\"", p));
            }
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        FieldKind::Dropdown {
            options,
            default_value,
        }
        | FieldKind::Radio {
            options,
            default_value,
        } => {
            let mut s = format!("options: {}", options.join(" | "));
            if let Some(d) = default_value {
                s.push_str(&format!("  (default: {})", d));
            }
            Some(s)
        }
        FieldKind::Checkbox { default_value } => Some(format!(
            "default: {}",
            if *default_value { "checked" } else { "unchecked" }
        )),
    }
}

/// Inline errors, labelled by field and listed in schema order.
pub fn render_errors(fields: &[FieldDefinition], errors: &ValidationErrorMap) -> String {
    let mut out = format!(
        "✖ Validation failed ({} error{})\n",
        errors.len(),
        if errors.len() != 1 { "s" } else { "" }
    );
    for f in fields {
        if let Some(e) = errors.get(&f.id) {
            out.push_str(&format!("  ❌ {}: {}\n", f.label, e));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use crate::validate::ValidationError;

    #[test]
    fn test_schema_lines_mark_selection_and_required() {
        let mut a = FieldDefinition::new(FieldType::Text);
        a.required = true;
        a.label = "Name".into();
        let b = FieldDefinition::new(FieldType::Dropdown);
        let out = render_schema(&[a.clone(), b], Some(&a.id));
        let first = out.lines().next().unwrap();
        assert!(first.starts_with(">"));
        assert!(first.contains("Name *"));
        assert!(out.contains("options: Option 1 | Option 2  (default: Option 1)"));
    }

    #[test]
    fn test_errors_listed_in_schema_order() {
        let mut a = FieldDefinition::new(FieldType::Text);
        a.label = "First".into();
        let mut b = FieldDefinition::new(FieldType::Text);
        b.label = "Second".into();
        let mut errors = ValidationErrorMap::new();
        errors.insert(b.id.clone(), ValidationError::Required);
        errors.insert(a.id.clone(), ValidationError::InvalidEmail);

        let out = render_errors(&[a, b], &errors);
        let first = out.find("First").unwrap();
        let second = out.find("Second").unwrap();
        assert!(first < second);
        assert!(out.starts_with("✖ Validation failed (2 errors)"));
    }
}
