//! Data models for formsmith
//!
//! Field kinds, catalog archetypes and the placed field instances that make
//! up a form on the canvas

use serde::{Deserialize, Serialize};

/// Number of option slots a freshly dropped select starts with
pub const DEFAULT_OPTION_SLOTS: usize = 3;

/// Errors raised while constructing catalog entries or field instances
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Unsupported field type: {0}. Use: text, multiline-text, single-select, boolean, date, file, number, email, action-button")]
    UnsupportedFieldType(String),

    #[error("Catalog must contain at least one field archetype")]
    EmptyCatalog,
}

/// The closed set of field kinds a form can contain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[serde(alias = "input")]
    Text,
    #[serde(alias = "textarea")]
    MultilineText,
    #[serde(alias = "select")]
    SingleSelect,
    #[serde(alias = "checkbox")]
    Boolean,
    Date,
    File,
    Number,
    Email,
    #[serde(alias = "button")]
    ActionButton,
}

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Text,
        FieldKind::MultilineText,
        FieldKind::SingleSelect,
        FieldKind::Boolean,
        FieldKind::Date,
        FieldKind::File,
        FieldKind::Number,
        FieldKind::Email,
        FieldKind::ActionButton,
    ];

    /// Canonical tag, also used as the id prefix of placed instances
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::MultilineText => "multiline-text",
            FieldKind::SingleSelect => "single-select",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::File => "file",
            FieldKind::Number => "number",
            FieldKind::Email => "email",
            FieldKind::ActionButton => "action-button",
        }
    }

    /// Whether the placeholder of this kind is user-editable
    pub fn has_placeholder(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::MultilineText)
    }

    pub fn has_options(&self) -> bool {
        matches!(self, FieldKind::SingleSelect)
    }

    /// Value an instance of this kind starts with
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Boolean => FieldValue::Flag(false),
            FieldKind::ActionButton => FieldValue::Action,
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Whether `value` is a legal bound value for this kind
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldKind::Boolean, FieldValue::Flag(_)) => true,
            (FieldKind::ActionButton, FieldValue::Action) => true,
            (FieldKind::Boolean | FieldKind::ActionButton, _) => false,
            (_, FieldValue::Text(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "input" => Ok(FieldKind::Text),
            "multiline-text" | "textarea" => Ok(FieldKind::MultilineText),
            "single-select" | "select" => Ok(FieldKind::SingleSelect),
            "boolean" | "checkbox" => Ok(FieldKind::Boolean),
            "date" => Ok(FieldKind::Date),
            "file" => Ok(FieldKind::File),
            "number" => Ok(FieldKind::Number),
            "email" => Ok(FieldKind::Email),
            "action-button" | "button" => Ok(FieldKind::ActionButton),
            _ => Err(FormError::UnsupportedFieldType(s.to_string())),
        }
    }
}

/// Current bound value of a field instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    /// Action buttons carry no value
    Action,
}

impl FieldValue {
    /// Empty values fail the required check. Buttons are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Flag(b) => !b,
            FieldValue::Action => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Flag(true) => write!(f, "[x]"),
            FieldValue::Flag(false) => write!(f, "[ ]"),
            FieldValue::Action => Ok(()),
        }
    }
}

/// A catalog entry: the template a placed field is created from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldArchetype {
    pub kind: FieldKind,
    pub label: String,
}

impl FieldArchetype {
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// A field placed on the canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldInstance {
    pub id: String,
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub value: FieldValue,
}

impl FieldInstance {
    /// Instantiate an archetype under the given id
    pub fn from_archetype(archetype: &FieldArchetype, id: String) -> Self {
        let options = if archetype.kind.has_options() {
            vec![String::new(); DEFAULT_OPTION_SLOTS]
        } else {
            Vec::new()
        };
        Self {
            id,
            kind: archetype.kind,
            label: archetype.label.clone(),
            placeholder: String::new(),
            options,
            value: archetype.kind.default_value(),
        }
    }
}

/// Field-level change applied through `CanvasState::update_field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Label(String),
    Placeholder(String),
    Options(Vec<String>),
    Value(FieldValue),
}

impl FieldUpdate {
    /// Produce the replacement instance, or `None` if the update does not
    /// apply to this kind
    pub fn apply(&self, field: &FieldInstance) -> Option<FieldInstance> {
        let mut next = field.clone();
        match self {
            FieldUpdate::Label(label) => next.label = label.clone(),
            FieldUpdate::Placeholder(placeholder) => next.placeholder = placeholder.clone(),
            FieldUpdate::Options(options) => {
                if !field.kind.has_options() || options.len() < DEFAULT_OPTION_SLOTS {
                    return None;
                }
                next.options = options.clone();
            }
            FieldUpdate::Value(value) => {
                if !field.kind.accepts(value) {
                    return None;
                }
                next.value = value.clone();
            }
        }
        Some(next)
    }
}
