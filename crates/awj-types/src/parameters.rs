//! Parameter space definitions: searched dimensions and fixed inputs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{AwjResult, ValidationError};

/// A single optimizable dimension with inclusive bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name (e.g. "pressure").
    pub name: String,
    pub low: f64,
    pub high: f64,
    /// Display unit (e.g. "MPa"). Informational only.
    #[serde(default)]
    pub unit: String,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, low: f64, high: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            low,
            high,
            unit: unit.into(),
        }
    }

    /// Width of the interval.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }

    /// Distance outside the bounds, normalised by the range. Zero when inside.
    pub fn violation(&self, value: f64) -> f64 {
        let outside = if value < self.low {
            self.low - value
        } else if value > self.high {
            value - self.high
        } else {
            0.0
        };
        outside / self.range()
    }

    pub fn validate(&self) -> AwjResult<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(ValidationError::InvalidBounds {
                parameter: self.name.clone(),
                low: self.low,
                high: self.high,
                reason: "low must be finite and strictly below high".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// The ordered set of optimizable dimensions.
///
/// Order is the candidate vector layout for the whole run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSpace {
    pub parameters: Vec<ParameterSpec>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        mut self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        unit: impl Into<String>,
    ) -> Self {
        self.parameters.push(ParameterSpec::new(name, low, high, unit));
        self
    }

    /// Build a space from ordered `(name, [low, high])` pairs. Units are left blank.
    pub fn from_ranges<I, S>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (S, [f64; 2])>,
        S: Into<String>,
    {
        Self {
            parameters: ranges
                .into_iter()
                .map(|(name, [low, high])| ParameterSpec::new(name, low, high, ""))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSpec> {
        self.parameters.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    /// Check every bound and reject empty spaces and duplicate names.
    pub fn validate(&self) -> AwjResult<()> {
        if self.parameters.is_empty() {
            return Err(ValidationError::EmptySpace.into());
        }
        let mut seen = HashSet::new();
        for spec in &self.parameters {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ValidationError::DuplicateParameter {
                    name: spec.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// True if every gene lies inside its dimension's bounds.
    pub fn contains(&self, genes: &[f64]) -> bool {
        genes.len() == self.parameters.len()
            && self
                .parameters
                .iter()
                .zip(genes)
                .all(|(spec, &g)| spec.contains(g))
    }
}

impl<'a> IntoIterator for &'a ParameterSpace {
    type Item = &'a ParameterSpec;
    type IntoIter = std::slice::Iter<'a, ParameterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Values for parameters that are not searched (nozzle geometry).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedInputs(Vec<f64>);

impl FixedInputs {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FixedInputs {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for FixedInputs {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AwjError;

    fn machine_space() -> ParameterSpace {
        ParameterSpace::new()
            .add("pressure", 100.0, 400.0, "MPa")
            .add("flow_rate", 0.1, 1.0, "kg/min")
            .add("traverse_rate", 100.0, 5000.0, "mm/min")
    }

    #[test]
    fn builder_preserves_order() {
        let space = machine_space();
        assert_eq!(space.len(), 3);
        assert_eq!(space.index_of("pressure"), Some(0));
        assert_eq!(space.index_of("traverse_rate"), Some(2));
        assert!(space.validate().is_ok());
    }

    #[test]
    fn from_ranges_keeps_caller_order() {
        let space = ParameterSpace::from_ranges([
            ("traverse_rate", [100.0, 5000.0]),
            ("pressure", [100.0, 400.0]),
        ]);
        assert_eq!(space.parameters[0].name, "traverse_rate");
        assert_eq!(space.parameters[1].name, "pressure");
    }

    #[test]
    fn equal_bounds_rejected() {
        let space = ParameterSpace::new().add("pressure", 200.0, 200.0, "MPa");
        match space.validate() {
            Err(AwjError::Validation(ValidationError::InvalidBounds { parameter, .. })) => {
                assert_eq!(parameter, "pressure")
            }
            other => panic!("expected InvalidBounds, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_bounds_rejected() {
        let space = ParameterSpace::new().add("pressure", 100.0, f64::INFINITY, "MPa");
        assert!(space.validate().is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let space = machine_space().add("pressure", 150.0, 300.0, "MPa");
        assert!(matches!(
            space.validate(),
            Err(AwjError::Validation(ValidationError::DuplicateParameter { .. }))
        ));
    }

    #[test]
    fn empty_space_rejected() {
        assert!(matches!(
            ParameterSpace::new().validate(),
            Err(AwjError::Validation(ValidationError::EmptySpace))
        ));
    }

    #[test]
    fn violation_is_normalised_distance() {
        let spec = ParameterSpec::new("pressure", 100.0, 400.0, "MPa");
        assert_eq!(spec.violation(250.0), 0.0);
        assert!((spec.violation(430.0) - 0.1).abs() < 1e-12);
        assert!((spec.violation(70.0) - 0.1).abs() < 1e-12);
        assert_eq!(spec.clip(430.0), 400.0);
        assert_eq!(spec.clip(70.0), 100.0);
    }

    #[test]
    fn space_contains_checks_every_dimension() {
        let space = machine_space();
        assert!(space.contains(&[250.0, 0.5, 1000.0]));
        assert!(!space.contains(&[250.0, 1.5, 1000.0]));
        assert!(!space.contains(&[250.0, 0.5]));
    }
}
