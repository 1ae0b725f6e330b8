//! Core data models for the LARS risk tool
//!
//! The feature record is the only data entity: eight clinical values in the
//! exact column order and naming the classifier was trained against.

use crate::model::PredictionError;
use serde::{Deserialize, Serialize};

/// Number of columns in a feature record
pub const NUM_FEATURES: usize = 8;

/// Column names in trained order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age",
    "BMI",
    "tumor_dist",
    "surg_time",
    "exhaust",
    "tumor_size",
    "TNM",
    "neoadjuvant",
];

/// Bounds, default and step of one input column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl FieldSpec {
    /// Returns true if the value lies within the inclusive bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a finite value into the inclusive bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Input columns in trained order
pub const FIELD_SPECS: [FieldSpec; NUM_FEATURES] = [
    FieldSpec {
        name: "age",
        label: "Age",
        unit: "years",
        min: 0.0,
        max: 120.0,
        default: 50.0,
        step: 1.0,
    },
    FieldSpec {
        name: "BMI",
        label: "BMI",
        unit: "kg/m²",
        min: 10.0,
        max: 50.0,
        default: 22.0,
        step: 0.1,
    },
    FieldSpec {
        name: "tumor_dist",
        label: "Tumor distance",
        unit: "cm",
        min: 0.0,
        max: 50.0,
        default: 5.0,
        step: 0.1,
    },
    FieldSpec {
        name: "surg_time",
        label: "Surgery time",
        unit: "minutes",
        min: 0.0,
        max: 600.0,
        default: 180.0,
        step: 1.0,
    },
    FieldSpec {
        name: "exhaust",
        label: "Days to first flatus",
        unit: "days",
        min: 0.0,
        max: 30.0,
        default: 2.0,
        step: 0.5,
    },
    FieldSpec {
        name: "tumor_size",
        label: "Tumor size",
        unit: "cm",
        min: 0.1,
        max: 20.0,
        default: 3.0,
        step: 0.1,
    },
    FieldSpec {
        name: "TNM",
        label: "TNM stage",
        unit: "stage",
        min: 1.0,
        max: 4.0,
        default: 2.0,
        step: 1.0,
    },
    FieldSpec {
        name: "neoadjuvant",
        label: "Neoadjuvant therapy",
        unit: "0 = no, 1 = yes",
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 1.0,
    },
];

/// Look up the spec of a column by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|spec| spec.name == name)
}

/// One row of classifier input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    pub tumor_dist: f64,
    pub surg_time: f64,
    pub exhaust: f64,
    pub tumor_size: f64,
    #[serde(rename = "TNM")]
    pub tnm: f64,
    pub neoadjuvant: f64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            age: 50.0,
            bmi: 22.0,
            tumor_dist: 5.0,
            surg_time: 180.0,
            exhaust: 2.0,
            tumor_size: 3.0,
            tnm: 2.0,
            neoadjuvant: 0.0,
        }
    }
}

impl FeatureRecord {
    /// Value of a column by its trained name
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "age" => self.age,
            "BMI" => self.bmi,
            "tumor_dist" => self.tumor_dist,
            "surg_time" => self.surg_time,
            "exhaust" => self.exhaust,
            "tumor_size" => self.tumor_size,
            "TNM" => self.tnm,
            "neoadjuvant" => self.neoadjuvant,
            _ => return None,
        };
        Some(value)
    }

    /// Mutable access to a column by its trained name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "age" => &mut self.age,
            "BMI" => &mut self.bmi,
            "tumor_dist" => &mut self.tumor_dist,
            "surg_time" => &mut self.surg_time,
            "exhaust" => &mut self.exhaust,
            "tumor_size" => &mut self.tumor_size,
            "TNM" => &mut self.tnm,
            "neoadjuvant" => &mut self.neoadjuvant,
            _ => return None,
        };
        Some(slot)
    }

    /// Values in trained column order
    pub fn values(&self) -> [f64; NUM_FEATURES] {
        [
            self.age,
            self.bmi,
            self.tumor_dist,
            self.surg_time,
            self.exhaust,
            self.tumor_size,
            self.tnm,
            self.neoadjuvant,
        ]
    }

    /// Build a model input row following `schema` column by column.
    ///
    /// Columns are matched by name, so a model exported with a different
    /// column order still receives each value in the right slot.
    pub fn row_for(&self, schema: &[String]) -> Result<Vec<f32>, PredictionError> {
        if schema.len() != NUM_FEATURES {
            return Err(PredictionError::ShapeMismatch {
                expected: schema.len(),
                actual: NUM_FEATURES,
            });
        }

        schema
            .iter()
            .map(|name| {
                self.get(name)
                    .map(|value| value as f32)
                    .ok_or_else(|| PredictionError::UnknownFeature(name.clone()))
            })
            .collect()
    }
}
