//! Form builder session: owns the canvas and routes gestures to it
//!
//! Modes:
//! - editing -> preview: submit with every required field filled
//! - editing -> editing + error banner: submit with a required field empty
//! - preview -> editing: close
//!
//! Edits keep flowing in both modes; nothing is discarded on close.

use crate::assembler::{self, AssembledForm, ValidationResult};
use crate::canvas::CanvasState;
use crate::catalog::Catalog;
use crate::dnd::{ContainerId, DropEvent};
use crate::editor::{EditOutcome, EditTarget, FieldEditor};
use crate::models::FieldValue;

/// What the builder currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderMode {
    Editing,
    PreviewVisible,
}

impl std::fmt::Display for BuilderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderMode::Editing => write!(f, "editing"),
            BuilderMode::PreviewVisible => write!(f, "preview"),
        }
    }
}

/// Effect of a drop on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No destination, unknown container or out-of-range source
    Ignored,
    /// A catalog item was placed at the end of the canvas
    Appended(String),
    Moved { from: usize, to: usize },
}

impl DropOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, DropOutcome::Ignored)
    }
}

/// Root coordinator of a form building session
#[derive(Debug)]
pub struct FormBuilder {
    catalog: Catalog,
    canvas: CanvasState,
    editor: FieldEditor,
    mode: BuilderMode,
    error: Option<ValidationResult>,
    required_count: usize,
}

impl FormBuilder {
    pub fn new(catalog: Catalog, required_count: usize) -> Self {
        Self {
            catalog,
            canvas: CanvasState::new(),
            editor: FieldEditor::new(),
            mode: BuilderMode::Editing,
            error: None,
            required_count,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }

    pub fn mode(&self) -> BuilderMode {
        self.mode
    }

    pub fn required_count(&self) -> usize {
        self.required_count
    }

    /// Whether the field at canvas position `index` is required
    pub fn is_required(&self, index: usize) -> bool {
        assembler::is_required(index, self.required_count)
    }

    /// Validation failure from the last submit, if any
    pub fn error(&self) -> Option<&ValidationResult> {
        self.error.as_ref()
    }

    pub fn error_banner(&self) -> Option<String> {
        self.error.as_ref().and_then(ValidationResult::banner)
    }

    /// Apply a finished drag gesture
    pub fn handle_drop(&mut self, event: &DropEvent) -> DropOutcome {
        let Some(destination) = event.destination.as_ref() else {
            tracing::debug!(source = %event.source.container, "drop outside any target ignored");
            return DropOutcome::Ignored;
        };

        let outcome = match (&event.source.container, &destination.container) {
            (ContainerId::Catalog, ContainerId::Canvas) => {
                // Catalog drops always land at the end; destination.index is not used.
                match self.catalog.get(event.source.index) {
                    Some(archetype) => {
                        let archetype = archetype.clone();
                        DropOutcome::Appended(self.canvas.append(&archetype))
                    }
                    None => DropOutcome::Ignored,
                }
            }
            (ContainerId::Canvas, ContainerId::Canvas) => {
                let (from, to) = (event.source.index, destination.index);
                if self.canvas.move_field(from, to) {
                    DropOutcome::Moved {
                        from,
                        to: to.min(self.canvas.len() - 1),
                    }
                } else {
                    DropOutcome::Ignored
                }
            }
            _ => DropOutcome::Ignored,
        };

        match &outcome {
            DropOutcome::Appended(id) => tracing::info!(id = %id, "field added"),
            DropOutcome::Moved { from, to } => tracing::info!(from, to, "field moved"),
            DropOutcome::Ignored => tracing::debug!(
                source = %event.source.container,
                destination = %destination.container,
                "drop ignored"
            ),
        }

        if outcome.changed() {
            self.editor.sync(&self.canvas);
        }
        outcome
    }

    /// Controlled value binding for field `id`
    pub fn update_field(&mut self, id: &str, value: FieldValue) -> EditOutcome {
        self.editor.set_value(&mut self.canvas, id, value)
    }

    pub fn edit_label(&mut self, id: &str, label: &str) -> EditOutcome {
        self.editor.edit_label(&mut self.canvas, id, label)
    }

    pub fn edit_placeholder(&mut self, id: &str, placeholder: &str) -> EditOutcome {
        self.editor.edit_placeholder(&mut self.canvas, id, placeholder)
    }

    pub fn edit_option(&mut self, id: &str, index: usize, text: &str) -> EditOutcome {
        self.editor.edit_option(&mut self.canvas, id, index, text)
    }

    pub fn toggle(&mut self, id: &str) -> EditOutcome {
        self.editor.toggle(&mut self.canvas, id)
    }

    pub fn cycle_selection(&mut self, id: &str, step: isize) -> EditOutcome {
        self.editor.cycle_selection(&mut self.canvas, id, step)
    }

    pub fn push_char(&mut self, id: &str, target: EditTarget, c: char) -> EditOutcome {
        self.editor.push_char(&mut self.canvas, id, target, c)
    }

    pub fn pop_char(&mut self, id: &str, target: EditTarget) -> EditOutcome {
        self.editor.pop_char(&mut self.canvas, id, target)
    }

    /// Validate the form and show the preview if it passes.
    ///
    /// While the preview is open the current result is returned but neither
    /// the mode nor the banner changes.
    pub fn submit(&mut self) -> ValidationResult {
        let result = assembler::validate(&self.canvas, self.required_count);
        if self.mode == BuilderMode::PreviewVisible {
            return result;
        }

        if result.is_valid() {
            self.error = None;
            self.mode = BuilderMode::PreviewVisible;
            tracing::info!(fields = self.canvas.len(), "form submitted");
            for warning in self.warnings() {
                tracing::warn!("{}", warning);
            }
        } else {
            tracing::info!(missing = ?result.missing(), "submit rejected");
            self.error = Some(result.clone());
        }
        result
    }

    /// Leave the preview; every field keeps its data
    pub fn close(&mut self) {
        if self.mode == BuilderMode::PreviewVisible {
            self.mode = BuilderMode::Editing;
            tracing::debug!("preview closed");
        }
    }

    /// Read-only projection of the current form
    pub fn preview(&self) -> AssembledForm {
        assembler::assemble(&self.canvas, self.required_count)
    }

    /// Non-blocking problems with entered values, shown alongside the preview
    pub fn warnings(&self) -> Vec<String> {
        assembler::lint_form(&self.canvas)
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new(Catalog::standard(), assembler::DEFAULT_REQUIRED_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::DragLocation;

    fn drop_from_catalog(builder: &mut FormBuilder, index: usize) -> String {
        let event = DropEvent::new(DragLocation::catalog(index), Some(DragLocation::canvas(0)));
        match builder.handle_drop(&event) {
            DropOutcome::Appended(id) => id,
            other => panic!("expected append, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_drop_appends_to_end() {
        let mut builder = FormBuilder::default();
        let first = drop_from_catalog(&mut builder, 0);
        let second = drop_from_catalog(&mut builder, 1);
        let ids: Vec<_> = builder.canvas().fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_drop_without_destination_is_noop() {
        let mut builder = FormBuilder::default();
        drop_from_catalog(&mut builder, 0);
        let before = builder.canvas().clone();

        let outcome = builder.handle_drop(&DropEvent::new(DragLocation::canvas(0), None));
        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(builder.canvas(), &before);
    }

    #[test]
    fn test_unknown_container_and_bad_index_are_noops() {
        let mut builder = FormBuilder::default();
        let trash = DragLocation::new(ContainerId::Other("trash".to_string()), 0);
        assert_eq!(
            builder.handle_drop(&DropEvent::new(DragLocation::catalog(0), Some(trash))),
            DropOutcome::Ignored
        );
        assert_eq!(
            builder.handle_drop(&DropEvent::new(DragLocation::catalog(42), Some(DragLocation::canvas(0)))),
            DropOutcome::Ignored
        );
        assert_eq!(
            builder.handle_drop(&DropEvent::new(DragLocation::canvas(0), Some(DragLocation::catalog(0)))),
            DropOutcome::Ignored
        );
        assert!(builder.canvas().is_empty());
    }

    #[test]
    fn test_canvas_reorder() {
        let mut builder = FormBuilder::default();
        let a = drop_from_catalog(&mut builder, 0);
        let b = drop_from_catalog(&mut builder, 1);
        let c = drop_from_catalog(&mut builder, 2);

        let outcome = builder.handle_drop(&DropEvent::new(
            DragLocation::canvas(2),
            Some(DragLocation::canvas(0)),
        ));
        assert_eq!(outcome, DropOutcome::Moved { from: 2, to: 0 });
        let ids: Vec<_> = builder.canvas().fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec![c, a, b]);
    }

    #[test]
    fn test_submit_failure_then_success_then_close() {
        let mut builder = FormBuilder::default();
        let a = drop_from_catalog(&mut builder, 0);
        let b = drop_from_catalog(&mut builder, 1);

        let result = builder.submit();
        assert!(!result.is_valid());
        assert_eq!(builder.mode(), BuilderMode::Editing);
        assert_eq!(
            builder.error_banner().unwrap(),
            "Please fill out required fields: Input Field, Textarea"
        );

        builder.update_field(&a, FieldValue::Text("x".to_string()));
        builder.update_field(&b, FieldValue::Text("y".to_string()));
        assert!(builder.submit().is_valid());
        assert_eq!(builder.mode(), BuilderMode::PreviewVisible);
        assert!(builder.error().is_none());

        let before = builder.canvas().clone();
        builder.close();
        assert_eq!(builder.mode(), BuilderMode::Editing);
        assert_eq!(builder.canvas(), &before);
    }

    #[test]
    fn test_edits_stay_live_in_preview() {
        let mut builder = FormBuilder::default();
        let a = drop_from_catalog(&mut builder, 0);
        builder.update_field(&a, FieldValue::Text("x".to_string()));
        builder.submit();

        assert!(builder.update_field(&a, FieldValue::Text("xy".to_string())).applied());
        assert_eq!(builder.preview().fields[0].value, FieldValue::Text("xy".to_string()));
        assert_eq!(builder.mode(), BuilderMode::PreviewVisible);
    }

    #[test]
    fn test_submit_in_preview_reports_current_state() {
        let mut builder = FormBuilder::default();
        let a = drop_from_catalog(&mut builder, 0);
        builder.update_field(&a, FieldValue::Text("x".to_string()));
        assert!(builder.submit().is_valid());

        builder.update_field(&a, FieldValue::Text(String::new()));
        assert_eq!(
            builder.submit(),
            ValidationResult::Invalid(vec!["Input Field".to_string()])
        );
        assert_eq!(builder.mode(), BuilderMode::PreviewVisible);
        assert!(builder.error().is_none());
    }

    #[test]
    fn test_warnings_flag_malformed_values() {
        let mut builder = FormBuilder::default();
        let number = drop_from_catalog(&mut builder, 6);
        assert!(builder.warnings().is_empty());

        builder.update_field(&number, FieldValue::Text("twelve".to_string()));
        assert_eq!(
            builder.warnings(),
            vec!["Number Input: 'twelve' is not a number".to_string()]
        );
    }

    #[test]
    fn test_close_while_editing_is_noop() {
        let mut builder = FormBuilder::default();
        builder.close();
        assert_eq!(builder.mode(), BuilderMode::Editing);
    }

    #[test]
    fn test_editor_buffers_follow_drops() {
        let mut builder = FormBuilder::default();
        let id = drop_from_catalog(&mut builder, 2);
        assert_eq!(builder.editor().buffer(&id).unwrap().options.len(), 3);
    }
}
