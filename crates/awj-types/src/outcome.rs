//! Optimization outcomes: termination reasons, per-generation statistics and
//! the structured result handed back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{AwjResult, ValidationError};

/// Unique optimization run identifier.
pub type RunId = Uuid;

/// Why the population engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The generation counter reached the configured maximum.
    MaxGenerations,
    /// Best-ever fitness stopped improving for the configured window.
    Stagnation,
    /// Best-ever fitness fell below the "good enough" threshold.
    Threshold,
    /// The caller-supplied deadline elapsed.
    Deadline,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MaxGenerations => "max-generations",
            Self::Stagnation => "stagnation",
            Self::Threshold => "threshold",
            Self::Deadline => "deadline",
        };
        f.write_str(s)
    }
}

/// Fitness summary for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Best fitness within this generation.
    pub generation_best: f64,
    /// Best fitness seen so far across all generations.
    pub best_ever: f64,
    pub mean_fitness: f64,
    /// Mean per-dimension standard deviation, normalised by range.
    pub diversity: f64,
}

/// A named parameter value in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Best-ever candidate of a run plus run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub run_id: RunId,
    /// Seed of the random stream; re-running with it reproduces the result.
    pub seed: u64,
    pub parameters: Vec<NamedValue>,
    pub fixed_inputs: Vec<NamedValue>,
    pub desired_depth: f64,
    pub predicted_depth: f64,
    /// Absolute depth error of the best candidate.
    pub residual: f64,
    pub fitness: f64,
    pub secondary_cost: f64,
    /// Generation in which the best candidate first appeared.
    pub found_at_generation: usize,
    pub generations_run: usize,
    pub evaluations: usize,
    pub termination: TerminationReason,
    pub history: Vec<GenerationStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl OptimizationResult {
    /// Look up an optimized parameter by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    /// Extract the contractual process parameters.
    pub fn process_parameters(&self) -> AwjResult<ProcessParameters> {
        ProcessParameters::try_from(self)
    }

    /// Compare everything except run id and wall-clock timestamps.
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.parameters == other.parameters
            && self.fixed_inputs == other.fixed_inputs
            && self.desired_depth == other.desired_depth
            && self.predicted_depth == other.predicted_depth
            && self.fitness == other.fitness
            && self.secondary_cost == other.secondary_cost
            && self.found_at_generation == other.found_at_generation
            && self.generations_run == other.generations_run
            && self.evaluations == other.evaluations
            && self.termination == other.termination
            && self.history == other.history
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(
            f,
            "  Generations: {} (best found at {})",
            self.generations_run, self.found_at_generation
        )?;
        writeln!(f, "  Termination: {}", self.termination)?;
        writeln!(
            f,
            "  Depth: {:.3} mm predicted, {:.3} mm desired (residual {:.4} mm)",
            self.predicted_depth, self.desired_depth, self.residual
        )?;
        writeln!(f, "  Fitness: {:.6}", self.fitness)?;
        writeln!(f, "  Parameters:")?;
        for p in &self.parameters {
            writeln!(f, "    {}: {:.3} {}", p.name, p.value, p.unit)?;
        }
        Ok(())
    }
}

/// Process parameters consumed by the machine controller, keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessParameters {
    /// Pump pressure (MPa).
    pub pressure: f64,
    /// Abrasive mass flow (kg/min).
    pub flow_rate: f64,
    /// Traverse rate (mm/min).
    pub traverse_rate: f64,
}

impl ProcessParameters {
    pub const PRESSURE: &'static str = "pressure";
    pub const FLOW_RATE: &'static str = "flow_rate";
    pub const TRAVERSE_RATE: &'static str = "traverse_rate";
}

impl TryFrom<&OptimizationResult> for ProcessParameters {
    type Error = crate::errors::AwjError;

    fn try_from(result: &OptimizationResult) -> AwjResult<Self> {
        let lookup = |name: &str| {
            result
                .value(name)
                .ok_or_else(|| ValidationError::MissingParameter {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            pressure: lookup(Self::PRESSURE)?,
            flow_rate: lookup(Self::FLOW_RATE)?,
            traverse_rate: lookup(Self::TRAVERSE_RATE)?,
        })
    }
}

/// Recommended process parameters together with the full run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub pressure: f64,
    pub flow_rate: f64,
    pub traverse_rate: f64,
    pub result: OptimizationResult,
}

impl Recommendation {
    pub fn from_result(result: OptimizationResult) -> AwjResult<Self> {
        let params = ProcessParameters::try_from(&result)?;
        Ok(Self {
            pressure: params.pressure,
            flow_rate: params.flow_rate,
            traverse_rate: params.traverse_rate,
            result,
        })
    }

    pub fn process_parameters(&self) -> ProcessParameters {
        ProcessParameters {
            pressure: self.pressure,
            flow_rate: self.flow_rate,
            traverse_rate: self.traverse_rate,
        }
    }
}
