use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted key holding the ordered field definitions.
pub const SCHEMA_KEY: &str = "formBuilderSchema";
/// Persisted key holding the ordered response log.
pub const RESPONSES_KEY: &str = "formResponses";

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub String);

impl FieldId {
    pub fn generate() -> Self {
        FieldId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        FieldId(s.to_string())
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        FieldId(s)
    }
}

/// The type token used when adding a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Title,
    Text,
    Dropdown,
    Checkbox,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Title,
        FieldType::Text,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Title => "title",
            FieldType::Text => "text",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Plain,
    Email,
    Password,
    Textarea,
}

impl InputType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Some(InputType::Plain),
            "email" => Some(InputType::Email),
            "password" => Some(InputType::Password),
            "textarea" => Some(InputType::Textarea),
            _ => None,
        }
    }
}

/// Per-type attributes. Serialized inline next to the common attributes,
/// discriminated by the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Title,
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, rename = "inputType")]
        input_type: InputType,
    },
    Dropdown {
        options: Vec<String>,
        #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    Checkbox {
        #[serde(default, rename = "defaultValue")]
        default_value: bool,
    },
    Radio {
        options: Vec<String>,
        #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
}

impl FieldKind {
    /// Type defaults applied when a field is first added.
    pub fn defaults_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Title => FieldKind::Title,
            FieldType::Text => FieldKind::Text {
                placeholder: None,
                input_type: InputType::Plain,
            },
            FieldType::Dropdown => {
                let options = default_options();
                FieldKind::Dropdown {
                    default_value: options.first().cloned(),
                    options,
                }
            }
            FieldType::Checkbox => FieldKind::Checkbox {
                default_value: false,
            },
            FieldType::Radio => {
                let options = default_options();
                FieldKind::Radio {
                    default_value: options.first().cloned(),
                    options,
                }
            }
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Title => FieldType::Title,
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Dropdown { .. } => FieldType::Dropdown,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Radio { .. } => FieldType::Radio,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            FieldKind::Dropdown { options, .. } | FieldKind::Radio { options, .. } => {
                Some(options.as_slice())
            }
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            FieldKind::Dropdown { options, .. } | FieldKind::Radio { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    /// The value a fresh form starts with for this field, if any.
    pub fn default_value(&self) -> Option<serde_json::Value> {
        match self {
            FieldKind::Dropdown { default_value, .. } | FieldKind::Radio { default_value, .. } => {
                default_value.clone().map(serde_json::Value::String)
            }
            FieldKind::Checkbox { default_value } => Some(serde_json::Value::Bool(*default_value)),
            FieldKind::Title | FieldKind::Text { .. } => None,
        }
    }
}

fn default_options() -> Vec<String> {
    vec!["Option 1".to_string(), "Option 2".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            id: FieldId::generate(),
            label: format!("New {} field", field_type),
            required: false,
            kind: FieldKind::defaults_for(field_type),
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind, FieldKind::Title)
    }
}

/// A partial update addressed by field id. Attributes the target variant
/// does not carry are ignored when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    pub id: FieldId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// `Some(None)` clears the placeholder; in JSON that is an explicit
    /// `"placeholder": null`, while an absent key leaves it unchanged.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl FieldPatch {
    pub fn new(id: impl Into<FieldId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Only called for keys that are present, so `null` maps to `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Submitted values keyed by field id.
pub type FormData = BTreeMap<FieldId, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub data: FormData,
}

/// The form a fresh install starts from: a heading, a required name and a
/// country picker.
pub fn starter_schema() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition {
            id: FieldId::generate(),
            label: "Untitled Form".into(),
            required: false,
            kind: FieldKind::Title,
        },
        FieldDefinition {
            id: FieldId::generate(),
            label: "Your Name".into(),
            required: true,
            kind: FieldKind::Text {
                placeholder: Some("Enter your name".into()),
                input_type: InputType::Plain,
            },
        },
        FieldDefinition {
            id: FieldId::generate(),
            label: "Country".into(),
            required: false,
            kind: FieldKind::Dropdown {
                options: vec!["India".into(), "USA".into(), "UK".into()],
                default_value: Some("India".into()),
            },
        },
    ]
}
