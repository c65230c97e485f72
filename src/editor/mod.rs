//! Field editor: per-instance edit buffers bound to the canvas
//!
//! Buffers hold label, placeholder and options while they are being typed.
//! They are a cache of the canvas: every edit is pushed through
//! `CanvasState::update_field` and `sync` rebuilds them whenever the canvas
//! moved on without the editor.

use std::collections::HashMap;

use crate::canvas::CanvasState;
use crate::models::{FieldInstance, FieldKind, FieldUpdate, FieldValue};

/// Editable part of a field addressed by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Label,
    Placeholder,
    Option(usize),
    Value,
}

impl EditTarget {
    /// Targets that make sense for `kind`, in inspector order
    pub fn for_kind(kind: FieldKind, option_count: usize) -> Vec<EditTarget> {
        let mut targets = vec![EditTarget::Label];
        if kind.has_placeholder() {
            targets.push(EditTarget::Placeholder);
        }
        if kind.has_options() {
            targets.extend((0..option_count).map(EditTarget::Option));
        }
        if kind != FieldKind::ActionButton {
            targets.push(EditTarget::Value);
        }
        targets
    }
}

impl std::fmt::Display for EditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditTarget::Label => write!(f, "Label"),
            EditTarget::Placeholder => write!(f, "Placeholder"),
            EditTarget::Option(i) => write!(f, "Option {}", i + 1),
            EditTarget::Value => write!(f, "Value"),
        }
    }
}

/// Result of an editor operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Ignored,
}

impl EditOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

impl From<bool> for EditOutcome {
    fn from(applied: bool) -> Self {
        if applied {
            EditOutcome::Applied
        } else {
            EditOutcome::Ignored
        }
    }
}

/// Local copy of the editable metadata of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub label: String,
    pub placeholder: String,
    pub options: Vec<String>,
}

impl From<&FieldInstance> for EditBuffer {
    fn from(field: &FieldInstance) -> Self {
        Self {
            label: field.label.clone(),
            placeholder: field.placeholder.clone(),
            options: field.options.clone(),
        }
    }
}

/// Edit buffers for every field on the canvas
#[derive(Debug, Default)]
pub struct FieldEditor {
    buffers: HashMap<String, EditBuffer>,
    synced_revision: Option<u64>,
}

impl FieldEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild buffers from the canvas if it changed since the last sync
    pub fn sync(&mut self, canvas: &CanvasState) {
        if self.synced_revision == Some(canvas.revision()) {
            return;
        }
        self.buffers = canvas
            .fields()
            .iter()
            .map(|field| (field.id.clone(), EditBuffer::from(field)))
            .collect();
        self.synced_revision = Some(canvas.revision());
        tracing::trace!(revision = canvas.revision(), fields = canvas.len(), "editor resynced");
    }

    pub fn is_synced(&self, canvas: &CanvasState) -> bool {
        self.synced_revision == Some(canvas.revision())
    }

    pub fn buffer(&self, id: &str) -> Option<&EditBuffer> {
        self.buffers.get(id)
    }

    pub fn edit_label(&mut self, canvas: &mut CanvasState, id: &str, label: &str) -> EditOutcome {
        self.commit(canvas, id, FieldUpdate::Label(label.to_string()))
    }

    pub fn edit_placeholder(
        &mut self,
        canvas: &mut CanvasState,
        id: &str,
        placeholder: &str,
    ) -> EditOutcome {
        self.commit(canvas, id, FieldUpdate::Placeholder(placeholder.to_string()))
    }

    /// Replace option `index` of a select, keeping every other entry
    pub fn edit_option(
        &mut self,
        canvas: &mut CanvasState,
        id: &str,
        index: usize,
        text: &str,
    ) -> EditOutcome {
        self.sync(canvas);
        let Some(buffer) = self.buffers.get(id) else {
            return EditOutcome::Ignored;
        };
        if index >= buffer.options.len() {
            return EditOutcome::Ignored;
        }
        let mut options = buffer.options.clone();
        options[index] = text.to_string();
        self.commit(canvas, id, FieldUpdate::Options(options))
    }

    /// Controlled value binding
    pub fn set_value(&mut self, canvas: &mut CanvasState, id: &str, value: FieldValue) -> EditOutcome {
        self.commit(canvas, id, FieldUpdate::Value(value))
    }

    /// Flip a boolean field
    pub fn toggle(&mut self, canvas: &mut CanvasState, id: &str) -> EditOutcome {
        match canvas.get(id).map(|f| f.value.clone()) {
            Some(FieldValue::Flag(checked)) => self.set_value(canvas, id, FieldValue::Flag(!checked)),
            _ => EditOutcome::Ignored,
        }
    }

    /// Select the option `step` places away from the current one, wrapping
    pub fn cycle_selection(&mut self, canvas: &mut CanvasState, id: &str, step: isize) -> EditOutcome {
        let Some(field) = canvas.get(id) else {
            return EditOutcome::Ignored;
        };
        if !field.kind.has_options() || field.options.is_empty() {
            return EditOutcome::Ignored;
        }
        let len = field.options.len() as isize;
        let current = field
            .value
            .as_text()
            .and_then(|v| field.options.iter().position(|o| o == v))
            .map(|i| i as isize)
            .unwrap_or(if step >= 0 { -1 } else { 0 });
        let next = (current + step).rem_euclid(len) as usize;
        let value = FieldValue::Text(field.options[next].clone());
        self.set_value(canvas, id, value)
    }

    /// Current text of a target, read from the buffer or the canvas
    pub fn text(&self, canvas: &CanvasState, id: &str, target: EditTarget) -> Option<String> {
        match target {
            EditTarget::Label => self.buffer(id).map(|b| b.label.clone()),
            EditTarget::Placeholder => self.buffer(id).map(|b| b.placeholder.clone()),
            EditTarget::Option(i) => self.buffer(id).and_then(|b| b.options.get(i).cloned()),
            EditTarget::Value => canvas
                .get(id)
                .and_then(|f| f.value.as_text().map(str::to_string)),
        }
    }

    /// Replace the whole text of a target
    pub fn write(
        &mut self,
        canvas: &mut CanvasState,
        id: &str,
        target: EditTarget,
        text: &str,
    ) -> EditOutcome {
        match target {
            EditTarget::Label => self.edit_label(canvas, id, text),
            EditTarget::Placeholder => self.edit_placeholder(canvas, id, text),
            EditTarget::Option(i) => self.edit_option(canvas, id, i, text),
            EditTarget::Value => self.set_value(canvas, id, FieldValue::Text(text.to_string())),
        }
    }

    pub fn push_char(
        &mut self,
        canvas: &mut CanvasState,
        id: &str,
        target: EditTarget,
        c: char,
    ) -> EditOutcome {
        self.sync(canvas);
        match self.text(canvas, id, target) {
            Some(mut text) => {
                text.push(c);
                self.write(canvas, id, target, &text)
            }
            None => EditOutcome::Ignored,
        }
    }

    pub fn pop_char(&mut self, canvas: &mut CanvasState, id: &str, target: EditTarget) -> EditOutcome {
        self.sync(canvas);
        match self.text(canvas, id, target) {
            Some(mut text) => {
                if text.pop().is_none() {
                    return EditOutcome::Ignored;
                }
                self.write(canvas, id, target, &text)
            }
            None => EditOutcome::Ignored,
        }
    }

    /// Push an update through the canvas, then refresh the buffer from it
    fn commit(&mut self, canvas: &mut CanvasState, id: &str, update: FieldUpdate) -> EditOutcome {
        let applied = canvas.update_field(id, &update);
        if !applied {
            tracing::debug!(id, ?update, "edit ignored");
        }
        self.sync(canvas);
        applied.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn setup(indices: &[usize]) -> (CanvasState, FieldEditor, Vec<String>) {
        let catalog = Catalog::standard();
        let mut canvas = CanvasState::new();
        let ids = indices
            .iter()
            .enumerate()
            .map(|(i, &idx)| canvas.append_at_time(catalog.get(idx).unwrap(), i as i64))
            .collect();
        let mut editor = FieldEditor::new();
        editor.sync(&canvas);
        (canvas, editor, ids)
    }

    #[test]
    fn test_label_edit_leaves_value_alone() {
        let (mut canvas, mut editor, ids) = setup(&[0]);
        editor.set_value(&mut canvas, &ids[0], FieldValue::Text("Ada".to_string()));
        assert!(editor.edit_label(&mut canvas, &ids[0], "Name").applied());

        let field = canvas.get(&ids[0]).unwrap();
        assert_eq!(field.label, "Name");
        assert_eq!(field.value.as_text(), Some("Ada"));
        assert_eq!(editor.buffer(&ids[0]).unwrap().label, "Name");
    }

    #[test]
    fn test_option_edit_changes_only_that_index() {
        let (mut canvas, mut editor, ids) = setup(&[2]);
        editor.edit_option(&mut canvas, &ids[0], 0, "Basic");
        editor.edit_option(&mut canvas, &ids[0], 2, "Pro");
        assert!(editor.edit_option(&mut canvas, &ids[0], 1, "Team").applied());

        let field = canvas.get(&ids[0]).unwrap();
        assert_eq!(field.options, vec!["Basic", "Team", "Pro"]);
    }

    #[test]
    fn test_option_edit_out_of_range_is_ignored() {
        let (mut canvas, mut editor, ids) = setup(&[2, 0]);
        assert_eq!(editor.edit_option(&mut canvas, &ids[0], 3, "x"), EditOutcome::Ignored);
        assert_eq!(editor.edit_option(&mut canvas, &ids[1], 0, "x"), EditOutcome::Ignored);
    }

    #[test]
    fn test_toggle_flips_boolean() {
        let (mut canvas, mut editor, ids) = setup(&[3, 0]);
        assert!(editor.toggle(&mut canvas, &ids[0]).applied());
        assert_eq!(canvas.get(&ids[0]).unwrap().value, FieldValue::Flag(true));
        editor.toggle(&mut canvas, &ids[0]);
        assert_eq!(canvas.get(&ids[0]).unwrap().value, FieldValue::Flag(false));
        assert_eq!(editor.toggle(&mut canvas, &ids[1]), EditOutcome::Ignored);
    }

    #[test]
    fn test_buffers_resync_after_canvas_changes() {
        let (mut canvas, mut editor, ids) = setup(&[0]);
        canvas.update_field(&ids[0], &FieldUpdate::Label("Changed upstream".to_string()));
        assert!(!editor.is_synced(&canvas));

        let id = canvas.append_at_time(Catalog::standard().get(1).unwrap(), 99);
        editor.sync(&canvas);
        assert_eq!(editor.buffer(&ids[0]).unwrap().label, "Changed upstream");
        assert_eq!(editor.buffer(&id).unwrap().label, "Textarea");
    }

    #[test]
    fn test_cycle_selection_wraps() {
        let (mut canvas, mut editor, ids) = setup(&[2]);
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            editor.edit_option(&mut canvas, &ids[0], i, text);
        }
        editor.cycle_selection(&mut canvas, &ids[0], 1);
        assert_eq!(canvas.get(&ids[0]).unwrap().value.as_text(), Some("a"));
        editor.cycle_selection(&mut canvas, &ids[0], -1);
        assert_eq!(canvas.get(&ids[0]).unwrap().value.as_text(), Some("c"));
    }

    #[test]
    fn test_typing_into_targets() {
        let (mut canvas, mut editor, ids) = setup(&[0]);
        for c in "Hi!".chars() {
            editor.push_char(&mut canvas, &ids[0], EditTarget::Placeholder, c);
        }
        editor.pop_char(&mut canvas, &ids[0], EditTarget::Placeholder);
        assert_eq!(canvas.get(&ids[0]).unwrap().placeholder, "Hi");

        editor.push_char(&mut canvas, &ids[0], EditTarget::Value, 'x');
        assert_eq!(canvas.get(&ids[0]).unwrap().value.as_text(), Some("x"));
    }

    #[test]
    fn test_targets_per_kind() {
        assert_eq!(
            EditTarget::for_kind(FieldKind::Text, 0),
            vec![EditTarget::Label, EditTarget::Placeholder, EditTarget::Value]
        );
        assert_eq!(
            EditTarget::for_kind(FieldKind::ActionButton, 0),
            vec![EditTarget::Label]
        );
        assert_eq!(EditTarget::for_kind(FieldKind::SingleSelect, 3).len(), 5);
    }
}
