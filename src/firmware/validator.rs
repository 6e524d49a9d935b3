//! Keymap validation.
//!
//! Checks a keymap's shape against the 67-key board and that every layer
//! key points at a layer that exists. Unreachable accent keys and empty
//! layers are reported as warnings.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use crate::models::action::LayerId;
use crate::models::keymap::{Keymap, Layer, ROW_LENGTHS};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Problems that make the keymap unusable
    pub errors: Vec<ValidationError>,
    /// Non-critical warnings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(&format!("⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation error with context.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Layer where the error occurred
    pub layer: Option<LayerId>,
    /// Row where the error occurred
    pub row: Option<usize>,
    /// Column where the error occurred
    pub col: Option<usize>,
    /// Human-readable error message
    pub message: String,
    /// Optional suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            layer: None,
            row: None,
            col: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets the layer context.
    #[must_use]
    pub const fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Sets the position context.
    #[must_use]
    pub const fn with_position(mut self, row: usize, col: usize) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(layer), Some(row), Some(col)) = (self.layer, self.row, self.col) {
            write!(
                f,
                "[Layer {} ({}, {})] {}: {}",
                layer, row, col, self.kind, self.message
            )?;
        } else if let Some(layer) = self.layer {
            write!(f, "[Layer {}] {}: {}", layer, self.kind, self.message)?;
        } else {
            write!(f, "{}: {}", self.kind, self.message)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    → {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A layer the firmware expects is not defined
    MissingLayer,
    /// The same layer is defined twice
    DuplicateLayer,
    /// A layer has the wrong number of rows
    WrongRowCount,
    /// A row has the wrong number of keys
    WrongRowLength,
    /// `LT`/`MO` targets a layer the keymap does not define
    UnknownLayerReference,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLayer => write!(f, "Missing Layer"),
            Self::DuplicateLayer => write!(f, "Duplicate Layer"),
            Self::WrongRowCount => write!(f, "Wrong Row Count"),
            Self::WrongRowLength => write!(f, "Wrong Row Length"),
            Self::UnknownLayerReference => write!(f, "Unknown Layer Reference"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Keymap validator.
pub struct KeymapValidator<'a> {
    keymap: &'a Keymap,
}

impl<'a> KeymapValidator<'a> {
    /// Creates a new keymap validator.
    #[must_use]
    pub const fn new(keymap: &'a Keymap) -> Self {
        Self { keymap }
    }

    /// Validates the keymap.
    ///
    /// Checks:
    /// - Every layer is defined exactly once
    /// - Every layer has five rows of 15, 15, 14, 13 and 10 keys
    /// - Every `LT`/`MO` key targets a defined layer
    ///
    /// Warns about accent keys on layers nothing can activate and about
    /// layers that are entirely transparent.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.validate_layer_set(&mut report);
        for layer in &self.keymap.layers {
            Self::validate_shape(&mut report, layer);
        }
        self.validate_layer_references(&mut report);
        self.validate_reachability(&mut report);
        self.validate_empty_layers(&mut report);

        report
    }

    fn validate_layer_set(&self, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        for layer in &self.keymap.layers {
            if !seen.insert(layer.id) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::DuplicateLayer,
                        format!("Layer {} is defined more than once", layer.id.qmk_name()),
                    )
                    .with_layer(layer.id)
                    .with_suggestion("Merge the duplicate layer definitions"),
                );
            }
        }

        for id in LayerId::ALL {
            if !seen.contains(&id) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::MissingLayer,
                        format!("Layer {} is not defined", id.qmk_name()),
                    )
                    .with_layer(id)
                    .with_suggestion("Add the layer; use _______ for keys it does not override"),
                );
            }
        }
    }

    fn validate_shape(report: &mut ValidationReport, layer: &Layer) {
        if layer.rows.len() != ROW_LENGTHS.len() {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::WrongRowCount,
                    format!(
                        "Layer has {} rows, expected {}",
                        layer.rows.len(),
                        ROW_LENGTHS.len()
                    ),
                )
                .with_layer(layer.id),
            );
        }

        for (row, (keys, expected)) in layer.rows.iter().zip(ROW_LENGTHS).enumerate() {
            if keys.len() != expected {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::WrongRowLength,
                        format!("Row {} has {} keys, expected {}", row, keys.len(), expected),
                    )
                    .with_layer(layer.id)
                    .with_suggestion("Rows follow LAYOUT_ansi_67: 15, 15, 14, 13, 10 keys"),
                );
            }
        }
    }

    fn defined_layers(&self) -> BTreeSet<LayerId> {
        self.keymap.layers.iter().map(|layer| layer.id).collect()
    }

    fn validate_layer_references(&self, report: &mut ValidationReport) {
        let defined = self.defined_layers();
        for layer in &self.keymap.layers {
            for (row, col, action) in layer.assigned() {
                if let Some(target) = action.layer_target() {
                    if !defined.contains(&target) {
                        report.add_error(
                            ValidationError::new(
                                ValidationErrorKind::UnknownLayerReference,
                                format!("{} targets undefined layer {}", action, target.qmk_name()),
                            )
                            .with_layer(layer.id)
                            .with_position(row, col),
                        );
                    }
                }
            }
        }
    }

    /// Layers the user can get to: the two dip-switch default layers plus
    /// whatever their layer keys activate, transitively.
    fn reachable_layers(&self) -> BTreeSet<LayerId> {
        let mut reachable: BTreeSet<LayerId> = [LayerId::Qwerty, LayerId::Qwerty2].into();
        let mut frontier: Vec<LayerId> = reachable.iter().copied().collect();

        while let Some(id) = frontier.pop() {
            let Some(layer) = self.keymap.layer(id) else {
                continue;
            };
            for (_, _, action) in layer.assigned() {
                if let Some(target) = action.layer_target() {
                    if reachable.insert(target) {
                        frontier.push(target);
                    }
                }
            }
        }

        reachable
    }

    fn validate_reachability(&self, report: &mut ValidationReport) {
        let reachable = self.reachable_layers();
        for layer in &self.keymap.layers {
            if reachable.contains(&layer.id) {
                continue;
            }
            for (row, col, action) in layer.assigned() {
                if let Some(accent) = action.accent() {
                    report.add_warning(ValidationWarning::new(format!(
                        "{} at ({}, {}) on layer {} is unreachable: no key activates the layer",
                        accent,
                        row,
                        col,
                        layer.id.qmk_name()
                    )));
                }
            }
        }
    }

    fn validate_empty_layers(&self, report: &mut ValidationReport) {
        for layer in &self.keymap.layers {
            if layer.key_count() > 0 && layer.assigned().next().is_none() {
                report.add_warning(ValidationWarning::new(format!(
                    "Layer {} is entirely transparent",
                    layer.id.qmk_name()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altcode::AccentKey;
    use crate::keycode_db::KeycodeDb;
    use crate::models::action::KeyAction;
    use crate::models::keycode::Keycode;

    fn builtin() -> Keymap {
        let db = KeycodeDb::load().unwrap();
        Keymap::builtin(&db).unwrap()
    }

    #[test]
    fn test_builtin_is_valid() {
        let keymap = builtin();
        let report = KeymapValidator::new(&keymap).validate();
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty(), "{}", report.format_message());
    }

    #[test]
    fn test_wrong_row_length() {
        let mut keymap = builtin();
        keymap.layers[2].rows[3].pop();
        let report = KeymapValidator::new(&keymap).validate();
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].kind, ValidationErrorKind::WrongRowLength);
        assert_eq!(report.errors[0].layer, Some(LayerId::Num));
    }

    #[test]
    fn test_missing_and_duplicate_layers() {
        let mut keymap = builtin();
        keymap.layers[3] = keymap.layers[2].clone();
        let report = KeymapValidator::new(&keymap).validate();
        let kinds: Vec<ValidationErrorKind> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateLayer));
        assert!(kinds.contains(&ValidationErrorKind::MissingLayer));
        assert!(kinds.contains(&ValidationErrorKind::UnknownLayerReference));
    }

    #[test]
    fn test_unreachable_accent_warning() {
        let mut keymap = builtin();
        // Drop the MO(_CONFIG) key and put an accent on the config layer
        keymap.layers[0].rows[4][6] = KeyAction::Key(Keycode::RCtrl);
        keymap.layers[3].rows[2][5] = KeyAction::Custom(AccentKey::E);

        let report = KeymapValidator::new(&keymap).validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("KX_E"));
    }

    #[test]
    fn test_transparent_layer_warning() {
        let mut keymap = builtin();
        for row in &mut keymap.layers[3].rows {
            row.fill(KeyAction::Transparent);
        }
        let report = KeymapValidator::new(&keymap).validate();
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("_CONFIG is entirely transparent")));
    }

    #[test]
    fn test_validation_report_format() {
        let mut report = ValidationReport::new();
        report.add_error(
            ValidationError::new(ValidationErrorKind::WrongRowLength, "Row 0 has 14 keys")
                .with_layer(LayerId::Qwerty)
                .with_suggestion("Add a key"),
        );
        report.add_warning(ValidationWarning::new("Layer _CONFIG is entirely transparent"));

        let message = report.format_message();
        assert!(message.contains("1 validation errors"));
        assert!(message.contains("[Layer QWERTY] Wrong Row Length"));
        assert!(message.contains("→ Add a key"));
        assert!(message.contains("1 warnings"));
    }
}
