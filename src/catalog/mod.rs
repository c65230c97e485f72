//! Field catalog: the palette of archetypes that can be dragged onto the canvas

use serde::{Deserialize, Serialize};

use crate::models::{FieldArchetype, FieldKind, FormError};

/// Catalog entry as written in config.toml, before the kind tag is checked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchetypeEntry {
    pub kind: String,
    pub label: String,
}

/// Ordered, immutable list of field archetypes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    archetypes: Vec<FieldArchetype>,
}

impl Catalog {
    /// The built-in palette
    pub fn standard() -> Self {
        Self {
            archetypes: vec![
                FieldArchetype::new(FieldKind::Text, "Input Field"),
                FieldArchetype::new(FieldKind::MultilineText, "Textarea"),
                FieldArchetype::new(FieldKind::SingleSelect, "Select Dropdown"),
                FieldArchetype::new(FieldKind::Boolean, "Checkbox"),
                FieldArchetype::new(FieldKind::Date, "Date Picker"),
                FieldArchetype::new(FieldKind::File, "File Upload"),
                FieldArchetype::new(FieldKind::Number, "Number Input"),
                FieldArchetype::new(FieldKind::Email, "Email Input"),
                FieldArchetype::new(FieldKind::ActionButton, "Button"),
            ],
        }
    }

    pub fn new(archetypes: Vec<FieldArchetype>) -> Result<Self, FormError> {
        if archetypes.is_empty() {
            return Err(FormError::EmptyCatalog);
        }
        Ok(Self { archetypes })
    }

    /// Build a catalog from configured entries, rejecting unknown kind tags
    pub fn from_entries(entries: &[ArchetypeEntry]) -> Result<Self, FormError> {
        let archetypes = entries
            .iter()
            .map(|entry| {
                let kind = entry.kind.parse::<FieldKind>()?;
                Ok(FieldArchetype::new(kind, entry.label.clone()))
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        Self::new(archetypes)
    }

    pub fn get(&self, index: usize) -> Option<&FieldArchetype> {
        self.archetypes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldArchetype> {
        self.archetypes.iter()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
