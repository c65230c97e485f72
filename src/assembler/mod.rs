//! Form assembly and submit-time validation
//!
//! Required fields are derived from canvas position: the first
//! `required_count` fields are required, nothing is stored per field.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use crate::canvas::CanvasState;
use crate::models::{FieldInstance, FieldKind, FieldValue};

/// Fields at positions below this are required unless configured otherwise
pub const DEFAULT_REQUIRED_COUNT: usize = 3;

/// Outcome of checking a form before preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    /// Labels of required fields left empty, in canvas order
    Invalid(Vec<String>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn missing(&self) -> &[String] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(labels) => labels,
        }
    }

    /// User-facing message, `None` when valid
    pub fn banner(&self) -> Option<String> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(labels) => Some(format!(
                "Please fill out required fields: {}",
                labels.join(", ")
            )),
        }
    }
}

/// Whether the field at canvas position `index` is required
pub fn is_required(index: usize, required_count: usize) -> bool {
    index < required_count
}

/// Ids of the required fields, in canvas order
pub fn required_ids(canvas: &CanvasState, required_count: usize) -> Vec<&str> {
    canvas
        .fields()
        .iter()
        .take(required_count)
        .map(|f| f.id.as_str())
        .collect()
}

/// Check every required field has a value
pub fn validate(canvas: &CanvasState, required_count: usize) -> ValidationResult {
    let missing: Vec<String> = canvas
        .fields()
        .iter()
        .take(required_count)
        .filter(|f| f.value.is_empty())
        .map(|f| f.label.clone())
        .collect();

    if missing.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(missing)
    }
}

/// One field of the read-only preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewField {
    pub id: String,
    pub kind: FieldKind,
    pub label: String,
    pub placeholder: String,
    pub options: Vec<String>,
    pub value: FieldValue,
    pub required: bool,
}

impl PreviewField {
    fn from_instance(field: &FieldInstance, required: bool) -> Self {
        Self {
            id: field.id.clone(),
            kind: field.kind,
            label: field.label.clone(),
            placeholder: field.placeholder.clone(),
            options: field.options.clone(),
            value: field.value.clone(),
            required,
        }
    }

    /// Action buttons render as buttons but never submit anything
    pub fn is_inert(&self) -> bool {
        self.kind == FieldKind::ActionButton
    }

    /// Single-line rendering of the control, one arm per kind
    pub fn control_text(&self) -> String {
        match self.kind {
            FieldKind::Text | FieldKind::Email | FieldKind::Number => {
                text_or_placeholder(&self.value, &self.placeholder)
            }
            FieldKind::MultilineText => {
                let text = text_or_placeholder(&self.value, &self.placeholder);
                text.lines().next().unwrap_or_default().to_string()
            }
            FieldKind::Date => match self.value.as_text() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => "YYYY-MM-DD".to_string(),
            },
            FieldKind::File => match self.value.as_text() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => "No file chosen".to_string(),
            },
            FieldKind::SingleSelect => {
                let current = self.value.as_text().unwrap_or_default();
                format!("{} v", current)
            }
            FieldKind::Boolean => format!("{} {}", self.value, self.label),
            FieldKind::ActionButton => {
                let label = if self.label.is_empty() { "Button" } else { self.label.as_str() };
                format!("[ {} ]", label)
            }
        }
    }
}

fn text_or_placeholder(value: &FieldValue, placeholder: &str) -> String {
    match value.as_text() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// The assembled form shown after a successful submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledForm {
    pub fields: Vec<PreviewField>,
}

/// Project the canvas into preview fields, in canvas order
pub fn assemble(canvas: &CanvasState, required_count: usize) -> AssembledForm {
    let fields = canvas
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| PreviewField::from_instance(f, is_required(i, required_count)))
        .collect();
    AssembledForm { fields }
}

/// Non-blocking checks on entered values (lint-like warnings)
pub fn lint_form(canvas: &CanvasState) -> Vec<String> {
    let mut warnings = Vec::new();
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    for field in canvas.fields() {
        let value = field.value.as_text().unwrap_or_default();

        match field.kind {
            FieldKind::Email if !value.is_empty() && !email_re.is_match(value) => {
                warnings.push(format!("{}: '{}' is not an email address", field.label, value));
            }
            FieldKind::Number if !value.is_empty() && value.parse::<f64>().is_err() => {
                warnings.push(format!("{}: '{}' is not a number", field.label, value));
            }
            FieldKind::Date
                if !value.is_empty()
                    && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() =>
            {
                warnings.push(format!("{}: '{}' is not a YYYY-MM-DD date", field.label, value));
            }
            FieldKind::SingleSelect => {
                let mut seen = HashSet::new();
                for option in field.options.iter().filter(|o| !o.is_empty()) {
                    if !seen.insert(option) {
                        warnings.push(format!("{}: Duplicate option '{}'", field.label, option));
                    }
                }
                if !value.is_empty() && !field.options.iter().any(|o| o == value) {
                    warnings.push(format!(
                        "{}: Selected value '{}' is no longer an option",
                        field.label, value
                    ));
                }
            }
            _ => {}
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::FieldUpdate;

    fn canvas_with(indices: &[usize]) -> (CanvasState, Vec<String>) {
        let catalog = Catalog::standard();
        let mut canvas = CanvasState::new();
        let ids = indices
            .iter()
            .enumerate()
            .map(|(i, &idx)| canvas.append_at_time(catalog.get(idx).unwrap(), i as i64))
            .collect();
        (canvas, ids)
    }

    fn set_text(canvas: &mut CanvasState, id: &str, text: &str) {
        assert!(canvas.update_field(id, &FieldUpdate::Value(FieldValue::Text(text.to_string()))));
    }

    #[test]
    fn test_required_prefix() {
        let (canvas, ids) = canvas_with(&[0, 1, 2, 3, 4]);
        assert_eq!(required_ids(&canvas, 3), vec![ids[0].as_str(), ids[1].as_str(), ids[2].as_str()]);

        let (short, short_ids) = canvas_with(&[0, 1]);
        assert_eq!(required_ids(&short, 3), vec![short_ids[0].as_str(), short_ids[1].as_str()]);
        assert!(required_ids(&CanvasState::new(), 3).is_empty());
    }

    #[test]
    fn test_empty_canvas_is_valid() {
        assert_eq!(validate(&CanvasState::new(), 3), ValidationResult::Valid);
    }

    #[test]
    fn test_reports_empty_required_labels_in_order() {
        let (mut canvas, ids) = canvas_with(&[0, 1, 2, 6]);
        set_text(&mut canvas, &ids[1], "hello");

        let result = validate(&canvas, 3);
        assert_eq!(
            result,
            ValidationResult::Invalid(vec!["Input Field".to_string(), "Select Dropdown".to_string()])
        );
        assert_eq!(
            result.banner().unwrap(),
            "Please fill out required fields: Input Field, Select Dropdown"
        );
    }

    #[test]
    fn test_optional_fields_do_not_block() {
        let (mut canvas, ids) = canvas_with(&[0, 1, 2, 7]);
        set_text(&mut canvas, &ids[0], "a");
        set_text(&mut canvas, &ids[1], "b");
        set_text(&mut canvas, &ids[2], "c");
        assert!(validate(&canvas, 3).is_valid());
    }

    #[test]
    fn test_unchecked_checkbox_counts_as_empty_and_button_never_does() {
        let (canvas, _) = canvas_with(&[3, 8]);
        assert_eq!(
            validate(&canvas, 3),
            ValidationResult::Invalid(vec!["Checkbox".to_string()])
        );
    }

    #[test]
    fn test_assemble_marks_required_and_keeps_order() {
        let (canvas, ids) = canvas_with(&[8, 0, 1, 2]);
        let form = assemble(&canvas, 3);
        let order: Vec<_> = form.fields.iter().map(|f| f.id.clone()).collect();
        assert_eq!(order, ids);
        let required: Vec<_> = form.fields.iter().map(|f| f.required).collect();
        assert_eq!(required, vec![true, true, true, false]);
        assert!(form.fields[0].is_inert());
        assert_eq!(form.fields[0].control_text(), "[ Button ]");
    }

    #[test]
    fn test_control_text_falls_back_to_placeholder() {
        let (mut canvas, ids) = canvas_with(&[0]);
        canvas.update_field(&ids[0], &FieldUpdate::Placeholder("Your name".to_string()));
        let form = assemble(&canvas, 3);
        assert_eq!(form.fields[0].control_text(), "Your name");
    }

    #[test]
    fn test_lint_warnings() {
        let (mut canvas, ids) = canvas_with(&[7, 6, 4, 2]);
        set_text(&mut canvas, &ids[0], "not-an-email");
        set_text(&mut canvas, &ids[1], "12a");
        set_text(&mut canvas, &ids[2], "2024-13-01");
        canvas.update_field(
            &ids[3],
            &FieldUpdate::Options(vec!["x".into(), "x".into(), "y".into()]),
        );
        set_text(&mut canvas, &ids[3], "z");

        let warnings = lint_form(&canvas);
        assert_eq!(warnings.len(), 5);
        assert!(warnings[0].contains("not an email"));
        assert!(warnings[1].contains("not a number"));
        assert!(warnings[2].contains("YYYY-MM-DD"));
        assert!(warnings[3].contains("Duplicate option 'x'"));
        assert!(warnings[4].contains("no longer an option"));
    }

    #[test]
    fn test_lint_accepts_well_formed_values() {
        let (mut canvas, ids) = canvas_with(&[7, 6, 4]);
        set_text(&mut canvas, &ids[0], "ada@example.com");
        set_text(&mut canvas, &ids[1], "-3.5");
        set_text(&mut canvas, &ids[2], "2024-02-29");
        assert!(lint_form(&canvas).is_empty());
    }
}
