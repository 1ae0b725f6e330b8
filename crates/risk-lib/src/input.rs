//! Input collection for the eight feature controls
//!
//! Each control is bounded and defaulted independently. Out-of-range
//! entries are clamped by the control, non-numeric entries are refused
//! and the control keeps its previous value.

use crate::models::{field_spec, FeatureRecord, FieldSpec, FIELD_SPECS, NUM_FEATURES};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Rejected control entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("unknown input field '{0}'")]
    UnknownField(String),

    #[error("{field}: '{text}' is not a number")]
    Invalid { field: String, text: String },

    #[error("{field}: value must be a finite number")]
    NotFinite { field: String },
}

impl InputError {
    /// Name of the field the entry was meant for
    pub fn field(&self) -> &str {
        match self {
            InputError::UnknownField(field)
            | InputError::Invalid { field, .. }
            | InputError::NotFinite { field } => field,
        }
    }
}

/// A bounded numeric control
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericControl {
    pub spec: FieldSpec,
    pub value: f64,
}

impl NumericControl {
    pub fn new(spec: FieldSpec) -> Self {
        Self {
            spec,
            value: spec.default,
        }
    }

    /// Set the control, clamping into bounds. Returns the stored value.
    pub fn set(&mut self, value: f64) -> Result<f64, InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite {
                field: self.spec.name.to_string(),
            });
        }
        self.value = self.spec.clamp(value);
        Ok(self.value)
    }
}

/// The eight controls of the input sidebar
#[derive(Debug, Clone)]
pub struct InputCollector {
    controls: [NumericControl; NUM_FEATURES],
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            controls: FIELD_SPECS.map(NumericControl::new),
        }
    }

    /// Controls in trained column order
    pub fn controls(&self) -> &[NumericControl] {
        &self.controls
    }

    fn control_mut(&mut self, name: &str) -> Result<&mut NumericControl, InputError> {
        self.controls
            .iter_mut()
            .find(|control| control.spec.name == name)
            .ok_or_else(|| InputError::UnknownField(name.to_string()))
    }

    /// Set a field by name, returning the clamped value
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, InputError> {
        self.control_mut(name)?.set(value)
    }

    /// Parse and set a field from user text
    pub fn set_str(&mut self, name: &str, text: &str) -> Result<f64, InputError> {
        if field_spec(name).is_none() {
            return Err(InputError::UnknownField(name.to_string()));
        }
        let value: f64 = text.trim().parse().map_err(|_| InputError::Invalid {
            field: name.to_string(),
            text: text.to_string(),
        })?;
        self.set(name, value)
    }

    /// Apply submitted form fields.
    ///
    /// Fields missing from the form keep their current value. Entries that
    /// are not feature columns (e.g. the submit button) are ignored.
    pub fn apply_form(&mut self, form: &HashMap<String, String>) -> Vec<InputError> {
        let mut errors = Vec::new();
        for spec in FIELD_SPECS.iter() {
            if let Some(text) = form.get(spec.name) {
                if let Err(e) = self.set_str(spec.name, text) {
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Apply a JSON-style map of numeric values; unknown keys are rejected
    pub fn apply_values(&mut self, values: &HashMap<String, f64>) -> Vec<InputError> {
        let mut errors: Vec<InputError> = values
            .iter()
            .filter_map(|(name, value)| self.set(name, *value).err())
            .collect();
        errors.sort_by(|a, b| a.field().cmp(b.field()));
        errors
    }

    /// Current values as a feature record
    pub fn snapshot(&self) -> FeatureRecord {
        let mut record = FeatureRecord::default();
        for control in self.controls.iter() {
            if let Some(slot) = record.get_mut(control.spec.name) {
                *slot = control.value;
            }
        }
        record
    }
}
