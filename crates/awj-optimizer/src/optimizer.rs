//! Public entry points: input validation, seeding and result assembly.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use awj_types::{
    AwjResult, FixedInputs, NamedValue, OptimizationResult, ParameterSpace, ParameterSpec,
    Recommendation, ValidationError,
};

use crate::config::OptimizerConfig;
use crate::engine::PopulationEngine;
use crate::fitness::FitnessEvaluator;
use crate::model::{AbrasiveJetCoefficients, AbrasiveJetModel, DepthModel};

/// Runs genetic searches against one depth model.
#[derive(Debug, Clone)]
pub struct Optimizer<M: DepthModel> {
    model: M,
    config: OptimizerConfig,
}

impl<M: DepthModel> Optimizer<M> {
    pub fn new(model: M, config: OptimizerConfig) -> AwjResult<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Match caller ranges to the model's parameters.
    ///
    /// Keys may be canonical names or labels. The returned space uses
    /// canonical names and units, laid out in the model's vector order.
    pub fn resolve_space(&self, ranges: &ParameterSpace) -> AwjResult<ParameterSpace> {
        if ranges.is_empty() {
            return Err(ValidationError::EmptySpace.into());
        }
        let expected = self.model.parameters();
        let mut slots: Vec<Option<ParameterSpec>> = vec![None; expected.len()];

        for spec in ranges {
            spec.validate()?;
            let index = expected
                .iter()
                .position(|p| p.matches(&spec.name))
                .ok_or_else(|| ValidationError::UnknownParameter {
                    name: spec.name.clone(),
                })?;
            if slots[index].is_some() {
                return Err(ValidationError::DuplicateParameter {
                    name: expected[index].name.to_string(),
                }
                .into());
            }
            let p = &expected[index];
            slots[index] = Some(ParameterSpec::new(p.name, spec.low, spec.high, p.unit));
        }

        let mut parameters = Vec::with_capacity(slots.len());
        for (slot, p) in slots.into_iter().zip(expected) {
            let spec = slot.ok_or_else(|| ValidationError::MissingParameter {
                name: p.name.to_string(),
            })?;
            parameters.push(spec);
        }
        Ok(ParameterSpace { parameters })
    }

    fn validate_fixed(&self, static_inputs: &[f64]) -> AwjResult<()> {
        let expected = self.model.fixed_inputs().len();
        if static_inputs.len() != expected {
            return Err(ValidationError::FixedInputCount {
                expected,
                actual: static_inputs.len(),
            }
            .into());
        }
        self.model.validate_fixed(static_inputs)
    }

    /// Search for parameters reproducing `desired_depth`.
    ///
    /// Without a `seed` one is drawn from OS entropy and recorded in the
    /// result. Validation and model errors abort the run; running out of
    /// generations, time or progress does not.
    pub fn run(
        &self,
        ranges: &ParameterSpace,
        static_inputs: &[f64],
        desired_depth: f64,
        seed: Option<u64>,
    ) -> AwjResult<OptimizationResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        let space = self.resolve_space(ranges)?;
        self.model.validate_ranges(&space)?;
        if !desired_depth.is_finite() || desired_depth <= 0.0 {
            return Err(ValidationError::NonPositiveDepth {
                depth: desired_depth,
            }
            .into());
        }
        self.validate_fixed(static_inputs)?;

        let evaluator = FitnessEvaluator::new(
            &self.model,
            static_inputs,
            desired_depth,
            self.config.weights,
        )?;

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        // Budgets too large to represent as an instant mean no deadline.
        let deadline = self.config.timeout().and_then(|t| start.checked_add(t));

        info!(
            "Starting search: seed {}, population {}, target depth {:.3}, {} parameters",
            seed,
            self.config.population_size,
            desired_depth,
            space.len()
        );

        let engine =
            PopulationEngine::initialize(&space, &evaluator, &self.config, deadline, &mut rng)?;
        let outcome = engine.run(&mut rng)?;

        let best = &outcome.best;
        let parameters = space
            .iter()
            .zip(best.genes())
            .map(|(spec, &value)| NamedValue {
                name: spec.name.clone(),
                value,
                unit: spec.unit.clone(),
            })
            .collect();
        let fixed_inputs = self
            .model
            .fixed_inputs()
            .iter()
            .zip(static_inputs)
            .map(|(p, &value)| NamedValue {
                name: p.name.to_string(),
                value,
                unit: p.unit.to_string(),
            })
            .collect();

        Ok(OptimizationResult {
            run_id: Uuid::new_v4(),
            seed,
            parameters,
            fixed_inputs,
            desired_depth,
            predicted_depth: best.depth(),
            residual: (best.depth() - desired_depth).abs(),
            fitness: best.fitness(),
            secondary_cost: best.secondary_cost(),
            found_at_generation: outcome.found_at_generation,
            generations_run: outcome.generations_run,
            evaluations: outcome.evaluations,
            termination: outcome.termination,
            history: outcome.history,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Recommend process parameters with the abrasive jet model and default
/// configuration.
///
/// `param_ranges` pairs each parameter name (or label such as "P (MPa)") with
/// its `[low, high]` bounds; `static_inputs` holds the focusing-tube and
/// orifice diameters in mm.
pub fn run_genetic_algorithm<I, S>(
    param_ranges: I,
    static_inputs: &[f64],
    desired_depth: f64,
) -> AwjResult<Recommendation>
where
    I: IntoIterator<Item = (S, [f64; 2])>,
    S: Into<String>,
{
    let optimizer = Optimizer::new(AbrasiveJetModel::default(), OptimizerConfig::default())?;
    let result = optimizer.run(
        &ParameterSpace::from_ranges(param_ranges),
        static_inputs,
        desired_depth,
        None,
    )?;
    Recommendation::from_result(result)
}

/// A serialisable optimization request for the abrasive jet model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Ordered parameter ranges.
    pub parameters: Vec<ParameterSpec>,
    /// Focusing-tube and orifice diameters (mm).
    pub static_inputs: FixedInputs,
    pub desired_depth: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub config: OptimizerConfig,
    #[serde(default)]
    pub coefficients: AbrasiveJetCoefficients,
}

impl OptimizationRequest {
    pub fn from_json_str(json: &str) -> AwjResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> AwjResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn run(&self) -> AwjResult<Recommendation> {
        let optimizer = Optimizer::new(
            AbrasiveJetModel::new(self.coefficients),
            self.config.clone(),
        )?;
        let space = ParameterSpace {
            parameters: self.parameters.clone(),
        };
        let result = optimizer.run(
            &space,
            self.static_inputs.as_slice(),
            self.desired_depth,
            self.seed,
        )?;
        Recommendation::from_result(result)
    }
}
