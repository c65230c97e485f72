//! Canvas state: the ordered list of fields placed on the form
//!
//! Order on the canvas is display order and submission order. Instances are
//! never mutated in place; updates build a replacement and swap it in.

use crate::models::{FieldArchetype, FieldInstance, FieldKind, FieldUpdate};

/// Ordered sequence of placed fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasState {
    fields: Vec<FieldInstance>,
    /// Bumped on every applied mutation
    revision: u64,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldInstance] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&FieldInstance> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Instantiate `archetype` with a fresh id and place it at the end
    pub fn append(&mut self, archetype: &FieldArchetype) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        self.append_at_time(archetype, millis)
    }

    /// `append` with an explicit creation timestamp
    pub fn append_at_time(&mut self, archetype: &FieldArchetype, millis: i64) -> String {
        let id = self.next_id(archetype.kind, millis);
        self.fields
            .push(FieldInstance::from_archetype(archetype, id.clone()));
        self.revision += 1;
        id
    }

    /// `<kind>-<millis>`, suffixed with `-<n>` if that id is already placed
    fn next_id(&self, kind: FieldKind, millis: i64) -> String {
        let base = format!("{}-{}", kind.tag(), millis);
        if !self.contains_id(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !self.contains_id(candidate))
            .unwrap_or(base)
    }

    /// Remove the field at `from` and reinsert it at `to`.
    ///
    /// `to` is clamped to the list end. Returns `false` if `from` is out of
    /// range.
    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        if from >= self.fields.len() {
            return false;
        }
        let field = self.fields.remove(from);
        let to = to.min(self.fields.len());
        self.fields.insert(to, field);
        self.revision += 1;
        true
    }

    /// Replace the field `id` with the result of applying `update` to it.
    ///
    /// Returns `false` for unknown ids and for updates the field's kind
    /// does not accept.
    pub fn update_field(&mut self, id: &str, update: &FieldUpdate) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        match update.apply(&self.fields[index]) {
            Some(next) => {
                if next != self.fields[index] {
                    self.fields[index] = next;
                    self.revision += 1;
                }
                true
            }
            None => false,
        }
    }
}
