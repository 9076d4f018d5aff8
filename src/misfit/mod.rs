//! Misfit measurement contract and registry.
//!
//! A misfit function compares two equal-length sequences: the low-resolution
//! reference first, the high-resolution candidate second. The crate ships no
//! misfit implementations; callers register theirs explicitly by name.
//!
//! A function may produce one measurement or several (e.g. the phase and
//! envelope parts of one comparison); `evaluate_all` flattens them.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// One misfit measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MisfitMeasurement {
    /// Internal snake_case name, usually the registered name.
    pub name: String,
    /// Human-readable name.
    pub pretty_name: String,
    pub value: f64,
    /// Values are best shown on a log scale.
    pub logarithmic_plot: bool,
    /// Smaller is better. False for similarity scores like cross-correlation.
    pub minimizing_misfit: bool,
}

/// A registered misfit function.
pub type MisfitFn = Box<dyn Fn(&[f64], &[f64]) -> Vec<MisfitMeasurement> + Send + Sync>;

/// Return types accepted from misfit functions.
pub trait IntoMeasurements {
    fn into_measurements(self) -> Vec<MisfitMeasurement>;
}

impl IntoMeasurements for MisfitMeasurement {
    fn into_measurements(self) -> Vec<MisfitMeasurement> {
        vec![self]
    }
}

impl IntoMeasurements for Vec<MisfitMeasurement> {
    fn into_measurements(self) -> Vec<MisfitMeasurement> {
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MisfitError {
    #[error("misfit '{0}' is already registered")]
    DuplicateName(String),

    #[error("sequences differ in length: {reference} vs {candidate}")]
    LengthMismatch { reference: usize, candidate: usize },

    #[error("sequences are empty")]
    EmptyInput,
}

/// Name → function mapping, iterated in name order.
#[derive(Default)]
pub struct MisfitRegistry {
    functions: BTreeMap<String, MisfitFn>,
}

impl MisfitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, R>(&mut self, name: impl Into<String>, f: F) -> Result<(), MisfitError>
    where
        F: Fn(&[f64], &[f64]) -> R + Send + Sync + 'static,
        R: IntoMeasurements,
    {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(MisfitError::DuplicateName(name));
        }
        self.functions
            .insert(name, Box::new(move |a: &[f64], b: &[f64]| f(a, b).into_measurements()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MisfitFn> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Run every registered function on the same pair of sequences, in name order.
    pub fn evaluate_all(&self, reference: &[f64], candidate: &[f64]) -> Result<Vec<MisfitMeasurement>, MisfitError> {
        if reference.len() != candidate.len() {
            return Err(MisfitError::LengthMismatch {
                reference: reference.len(),
                candidate: candidate.len(),
            });
        }
        if reference.is_empty() {
            return Err(MisfitError::EmptyInput);
        }
        Ok(self
            .functions
            .values()
            .flat_map(|f| f(reference, candidate))
            .collect())
    }
}

impl std::fmt::Debug for MisfitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MisfitRegistry").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_abs_difference(a: &[f64], b: &[f64]) -> MisfitMeasurement {
        let value = a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max);
        MisfitMeasurement {
            name: "max_abs_difference".to_string(),
            pretty_name: "Maximum Absolute Difference".to_string(),
            value,
            logarithmic_plot: false,
            minimizing_misfit: true,
        }
    }

    fn registry() -> MisfitRegistry {
        let mut r = MisfitRegistry::new();
        r.register("max_abs_difference", max_abs_difference).unwrap();
        r.register("agreement", |a: &[f64], b: &[f64]| MisfitMeasurement {
            name: "agreement".to_string(),
            pretty_name: "Sample Agreement".to_string(),
            value: a.iter().zip(b).filter(|(x, y)| x == y).count() as f64 / a.len() as f64,
            logarithmic_plot: false,
            minimizing_misfit: false,
        })
        .unwrap();
        r
    }

    #[test]
    fn evaluates_in_name_order() {
        let r = registry();
        assert_eq!(r.names(), vec!["agreement", "max_abs_difference"]);

        let out = r.evaluate_all(&[1.0, 2.0, 3.0], &[1.0, 2.5, 3.0]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "agreement");
        assert!((out[0].value - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(out[1].value, 0.5);
        assert!(out[1].minimizing_misfit);
    }

    #[test]
    fn multi_measurement_functions_are_flattened() {
        let mut r = registry();
        r.register("split", |a: &[f64], b: &[f64]| {
            let above = a.iter().zip(b).filter(|(x, y)| x > y).count() as f64;
            let below = a.iter().zip(b).filter(|(x, y)| x < y).count() as f64;
            vec![
                MisfitMeasurement {
                    name: "split_above".to_string(),
                    pretty_name: "Samples Above".to_string(),
                    value: above,
                    logarithmic_plot: false,
                    minimizing_misfit: true,
                },
                MisfitMeasurement {
                    name: "split_below".to_string(),
                    pretty_name: "Samples Below".to_string(),
                    value: below,
                    logarithmic_plot: false,
                    minimizing_misfit: true,
                },
            ]
        })
        .unwrap();

        let out = r.evaluate_all(&[1.0, 2.0, 3.0], &[0.0, 2.5, 3.0]).unwrap();
        let names: Vec<&str> = out.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["agreement", "max_abs_difference", "split_above", "split_below"]);
        assert_eq!(out[2].value, 1.0);
        assert_eq!(out[3].value, 1.0);
        assert_eq!(r.get("split").unwrap()(&[1.0], &[1.0]).len(), 2);
    }

    #[test]
    fn rejects_mismatched_or_empty_sequences() {
        let r = registry();
        assert_eq!(
            r.evaluate_all(&[1.0], &[1.0, 2.0]).unwrap_err(),
            MisfitError::LengthMismatch { reference: 1, candidate: 2 }
        );
        assert_eq!(r.evaluate_all(&[], &[]).unwrap_err(), MisfitError::EmptyInput);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut r = registry();
        let err = r.register("agreement", max_abs_difference).unwrap_err();
        assert_eq!(err, MisfitError::DuplicateName("agreement".to_string()));
        assert_eq!(r.len(), 2);
        assert!(r.get("max_abs_difference").is_some());
    }

    #[test]
    fn measurement_serializes_with_stable_field_names() {
        let m = max_abs_difference(&[0.0], &[2.0]);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["name"], "max_abs_difference");
        assert_eq!(json["value"], 2.0);
        assert_eq!(json["logarithmic_plot"], false);
        assert_eq!(json["minimizing_misfit"], true);
        assert!(json.get("pretty_name").is_some());
    }
}
