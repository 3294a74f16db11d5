use crate::model::{FieldDefinition, FieldId, FieldKind, FormData, InputType};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const TEXTAREA_MAX_LEN: usize = 500;
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // One '@', no whitespace anywhere, and a '.' somewhere after the '@'.
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Why a single value was refused. Password rules are listed in the order
/// they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    InvalidEmail,
    PasswordTooShort,
    PasswordMissingUppercase,
    PasswordMissingLowercase,
    PasswordMissingDigit,
    PasswordMissingSpecial,
    TooLong { max: usize },
    /// The value's JSON shape does not fit the field (text, dropdown and
    /// radio take strings, checkbox takes a bool).
    WrongType { expected: &'static str },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Required => "required",
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::PasswordTooShort => "password_too_short",
            ValidationError::PasswordMissingUppercase => "password_missing_uppercase",
            ValidationError::PasswordMissingLowercase => "password_missing_lowercase",
            ValidationError::PasswordMissingDigit => "password_missing_digit",
            ValidationError::PasswordMissingSpecial => "password_missing_special",
            ValidationError::TooLong { .. } => "too_long",
            ValidationError::WrongType { .. } => "wrong_type",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationError::Required => "This field is required".into(),
            ValidationError::InvalidEmail => "Please enter a valid email address".into(),
            ValidationError::PasswordTooShort => {
                format!("Password must be at least {} characters", PASSWORD_MIN_LEN)
            }
            ValidationError::PasswordMissingUppercase => {
                "Password must contain an uppercase letter".into()
            }
            ValidationError::PasswordMissingLowercase => {
                "Password must contain a lowercase letter".into()
            }
            ValidationError::PasswordMissingDigit => "Password must contain a number".into(),
            ValidationError::PasswordMissingSpecial => {
                format!("Password must contain a special character ({})", PASSWORD_SPECIALS)
            }
            ValidationError::TooLong { max } => format!("Must be at most {} characters", max),
            ValidationError::WrongType { expected } => format!("Expected a {} value", expected),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ValidationError", 2)?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

/// Failures keyed by field id. Empty means the data can be submitted.
pub type ValidationErrorMap = BTreeMap<FieldId, ValidationError>;

/// Checks one value against its field's rule.
pub fn validate_field(
    field: &FieldDefinition,
    value: Option<&serde_json::Value>,
) -> Option<ValidationError> {
    if field.is_title() {
        return None;
    }

    if let Some(err) = check_shape(field, value) {
        return Some(err);
    }

    if field.required && is_blank(value) {
        return Some(ValidationError::Required);
    }

    let FieldKind::Text { input_type, .. } = &field.kind else {
        return None;
    };
    let text = value.and_then(|v| v.as_str()).unwrap_or("");

    match input_type {
        InputType::Email if !text.is_empty() => {
            if !EMAIL_RE.is_match(text) {
                return Some(ValidationError::InvalidEmail);
            }
        }
        InputType::Password if !text.is_empty() => return check_password(text),
        InputType::Textarea => {
            if text.chars().count() > TEXTAREA_MAX_LEN {
                return Some(ValidationError::TooLong {
                    max: TEXTAREA_MAX_LEN,
                });
            }
        }
        _ => {}
    }
    None
}

/// Applies [`validate_field`] to every non-title field of `schema`.
pub fn validate(schema: &[FieldDefinition], data: &FormData) -> ValidationErrorMap {
    schema
        .iter()
        .filter(|f| !f.is_title())
        .filter_map(|f| validate_field(f, data.get(&f.id)).map(|e| (f.id.clone(), e)))
        .collect()
}

/// Null counts as absent and is left to the required rule.
fn check_shape(
    field: &FieldDefinition,
    value: Option<&serde_json::Value>,
) -> Option<ValidationError> {
    let value = value.filter(|v| !v.is_null())?;
    let (fits, expected) = match field.kind {
        FieldKind::Title => return None,
        FieldKind::Checkbox { .. } => (value.is_boolean(), "boolean"),
        FieldKind::Text { .. } | FieldKind::Dropdown { .. } | FieldKind::Radio { .. } => {
            (value.is_string(), "string")
        }
    };
    (!fits).then_some(ValidationError::WrongType { expected })
}

fn is_blank(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_password(pw: &str) -> Option<ValidationError> {
    if pw.chars().count() < PASSWORD_MIN_LEN {
        return Some(ValidationError::PasswordTooShort);
    }
    if !pw.chars().any(|c| c.is_ascii_uppercase()) {
        return Some(ValidationError::PasswordMissingUppercase);
    }
    if !pw.chars().any(|c| c.is_ascii_lowercase()) {
        return Some(ValidationError::PasswordMissingLowercase);
    }
    if !pw.chars().any(|c| c.is_ascii_digit()) {
        return Some(ValidationError::PasswordMissingDigit);
    }
    if !pw.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Some(ValidationError::PasswordMissingSpecial);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use serde_json::json;

    fn text(input_type: InputType, required: bool) -> FieldDefinition {
        let mut f = FieldDefinition::new(FieldType::Text);
        f.required = required;
        f.kind = FieldKind::Text {
            placeholder: None,
            input_type,
        };
        f
    }

    #[test]
    fn test_required_short_circuits() {
        let f = text(InputType::Email, true);
        assert_eq!(validate_field(&f, None), Some(ValidationError::Required));
        assert_eq!(
            validate_field(&f, Some(&json!(null))),
            Some(ValidationError::Required)
        );
        assert_eq!(
            validate_field(&f, Some(&json!("   "))),
            Some(ValidationError::Required)
        );
    }

    #[test]
    fn test_required_accepts_false_checkbox() {
        let mut f = FieldDefinition::new(FieldType::Checkbox);
        f.required = true;
        assert_eq!(validate_field(&f, Some(&json!(false))), None);
        assert_eq!(validate_field(&f, None), Some(ValidationError::Required));
    }

    #[test]
    fn test_optional_empty_email_is_fine() {
        let f = text(InputType::Email, false);
        assert_eq!(validate_field(&f, Some(&json!(""))), None);
        assert_eq!(validate_field(&f, None), None);
    }

    #[test]
    fn test_password_reports_first_violation() {
        let f = text(InputType::Password, false);
        let check = |s: &str| validate_field(&f, Some(&json!(s)));
        assert_eq!(check("Ab1!"), Some(ValidationError::PasswordTooShort));
        assert_eq!(check("ABCDEFG1!"), Some(ValidationError::PasswordMissingLowercase));
        assert_eq!(check("Abcdefgh1"), Some(ValidationError::PasswordMissingSpecial));
        assert_eq!(check("Abcdef1!"), None);
    }

    #[test]
    fn test_textarea_limit_counts_chars() {
        let f = text(InputType::Textarea, false);
        let ok = "é".repeat(TEXTAREA_MAX_LEN);
        let long = "a".repeat(TEXTAREA_MAX_LEN + 1);
        assert_eq!(validate_field(&f, Some(&json!(ok))), None);
        assert_eq!(
            validate_field(&f, Some(&json!(long))),
            Some(ValidationError::TooLong {
                max: TEXTAREA_MAX_LEN
            })
        );
    }

    #[test]
    fn test_value_shape_must_fit_field() {
        let email = text(InputType::Email, true);
        assert_eq!(
            validate_field(&email, Some(&json!(42))),
            Some(ValidationError::WrongType { expected: "string" })
        );

        let agree = FieldDefinition::new(FieldType::Checkbox);
        assert_eq!(
            validate_field(&agree, Some(&json!("definitely not a bool"))),
            Some(ValidationError::WrongType { expected: "boolean" })
        );
        assert_eq!(validate_field(&agree, Some(&json!(true))), None);

        let size = FieldDefinition::new(FieldType::Radio);
        assert_eq!(
            validate_field(&size, Some(&json!(["S"]))),
            Some(ValidationError::WrongType { expected: "string" })
        );
        assert_eq!(validate_field(&size, Some(&json!(null))), None);
    }

    #[test]
    fn test_title_never_validated() {
        let mut f = FieldDefinition::new(FieldType::Title);
        f.required = true;
        assert_eq!(validate_field(&f, None), None);
    }

    #[test]
    fn test_error_serializes_code_and_message() {
        let v = serde_json::to_value(ValidationError::InvalidEmail).unwrap();
        assert_eq!(v["code"], "invalid_email");
        assert_eq!(v["message"], "Please enter a valid email address");
    }
}
