//! Fitness evaluation: depth error, bound-violation penalty and secondary cost
//! folded into a single scalar. Lower is better.

use serde::{Deserialize, Serialize};

use awj_types::{config_error, AwjResult, ModelError, ValidationError};

use crate::model::DepthModel;
use crate::population::{Candidate, EvaluatedCandidate};

/// How the depth error is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    #[default]
    Absolute,
    Squared,
}

impl ErrorMetric {
    pub fn apply(self, predicted: f64, desired: f64) -> f64 {
        let diff = predicted - desired;
        match self {
            Self::Absolute => diff.abs(),
            Self::Squared => diff * diff,
        }
    }
}

/// Relative weights of the fitness terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Weight of the depth error; the dominant term.
    pub depth_error: f64,
    /// Weight of the normalised pre-clip bound violation.
    pub bound_penalty: f64,
    /// Tie-breaking weight of the model's secondary cost.
    pub secondary: f64,
    pub metric: ErrorMetric,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            depth_error: 1.0,
            bound_penalty: 10.0,
            secondary: 1e-4,
            metric: ErrorMetric::Absolute,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> AwjResult<()> {
        for (name, w) in [
            ("depth_error", self.depth_error),
            ("bound_penalty", self.bound_penalty),
            ("secondary", self.secondary),
        ] {
            if !w.is_finite() || w <= 0.0 {
                return Err(config_error!("fitness weight {name} must be positive, got {w}"));
            }
        }
        Ok(())
    }
}

/// Scores candidates against a desired depth for one run.
pub struct FitnessEvaluator<'a, M: DepthModel + ?Sized> {
    model: &'a M,
    fixed: &'a [f64],
    desired_depth: f64,
    weights: FitnessWeights,
}

impl<'a, M: DepthModel + ?Sized> FitnessEvaluator<'a, M> {
    pub fn new(
        model: &'a M,
        fixed: &'a [f64],
        desired_depth: f64,
        weights: FitnessWeights,
    ) -> AwjResult<Self> {
        weights.validate()?;
        if !desired_depth.is_finite() || desired_depth <= 0.0 {
            return Err(ValidationError::NonPositiveDepth {
                depth: desired_depth,
            }
            .into());
        }
        let expected = model.fixed_inputs().len();
        if fixed.len() != expected {
            return Err(ValidationError::FixedInputCount {
                expected,
                actual: fixed.len(),
            }
            .into());
        }
        Ok(Self {
            model,
            fixed,
            desired_depth,
            weights,
        })
    }

    pub fn desired_depth(&self) -> f64 {
        self.desired_depth
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Combine the terms. `violation` is zero for candidates that never left
    /// their bounds.
    pub fn score(&self, depth: f64, secondary_cost: f64, violation: f64) -> f64 {
        let w = &self.weights;
        w.depth_error * w.metric.apply(depth, self.desired_depth)
            + w.bound_penalty * violation
            + w.secondary * secondary_cost
    }

    pub fn evaluate(&self, candidate: Candidate) -> AwjResult<EvaluatedCandidate> {
        let expected = self.model.parameters().len();
        if candidate.genes().len() != expected {
            return Err(ModelError::Dimension {
                expected,
                actual: candidate.genes().len(),
            }
            .into());
        }

        let prediction = self.model.predict(candidate.genes(), self.fixed);
        if !prediction.depth.is_finite() || !prediction.secondary_cost.is_finite() {
            return Err(ModelError::NonFinite {
                depth: prediction.depth,
                secondary_cost: prediction.secondary_cost,
                genes: candidate.genes().to_vec(),
            }
            .into());
        }
        if prediction.secondary_cost < 0.0 {
            return Err(ModelError::NegativeCost {
                secondary_cost: prediction.secondary_cost,
                genes: candidate.genes().to_vec(),
            }
            .into());
        }

        let fitness = self.score(
            prediction.depth,
            prediction.secondary_cost,
            candidate.violation(),
        );
        Ok(EvaluatedCandidate::new(
            candidate,
            fitness,
            prediction.depth,
            prediction.secondary_cost,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbrasiveJetModel, ModelParameter, Prediction};
    use awj_types::{AwjError, ParameterSpace};

    struct Linear;

    const LINEAR_PARAMS: [ModelParameter; 1] = [ModelParameter::new("x", "x", "")];

    impl DepthModel for Linear {
        fn parameters(&self) -> &[ModelParameter] {
            &LINEAR_PARAMS
        }
        fn fixed_inputs(&self) -> &[ModelParameter] {
            &[]
        }
        fn predict(&self, params: &[f64], _fixed: &[f64]) -> Prediction {
            Prediction {
                depth: params[0],
                secondary_cost: 1.0,
            }
        }
    }

    struct Broken;

    impl DepthModel for Broken {
        fn parameters(&self) -> &[ModelParameter] {
            &LINEAR_PARAMS
        }
        fn fixed_inputs(&self) -> &[ModelParameter] {
            &[]
        }
        fn predict(&self, params: &[f64], _fixed: &[f64]) -> Prediction {
            Prediction {
                depth: 1.0 / (params[0] - params[0]),
                secondary_cost: 0.0,
            }
        }
    }

    fn line_space() -> ParameterSpace {
        ParameterSpace::new().add("x", 0.0, 10.0, "")
    }

    #[test]
    fn exact_depth_leaves_only_secondary_term() {
        let eval = FitnessEvaluator::new(&Linear, &[], 4.0, FitnessWeights::default()).unwrap();
        assert_eq!(eval.desired_depth(), 4.0);
        assert_eq!(eval.weights(), &FitnessWeights::default());
        let scored = eval
            .evaluate(Candidate::clipped(vec![4.0], &line_space()))
            .unwrap();
        assert!((scored.fitness() - 1e-4).abs() < 1e-12);
        assert_eq!(scored.depth(), 4.0);
    }

    #[test]
    fn depth_error_dominates() {
        let eval = FitnessEvaluator::new(&Linear, &[], 4.0, FitnessWeights::default()).unwrap();
        let near = eval.score(4.1, 1.0, 0.0);
        let far = eval.score(5.0, 0.0, 0.0);
        assert!(near < far);
    }

    #[test]
    fn squared_metric() {
        let weights = FitnessWeights {
            metric: ErrorMetric::Squared,
            ..FitnessWeights::default()
        };
        let eval = FitnessEvaluator::new(&Linear, &[], 4.0, weights).unwrap();
        assert!((eval.score(7.0, 0.0, 0.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn bound_violation_penalised_monotonically() {
        let eval = FitnessEvaluator::new(&Linear, &[], 10.0, FitnessWeights::default()).unwrap();
        let space = line_space();
        let inside = eval.evaluate(Candidate::clipped(vec![10.0], &space)).unwrap();
        let slightly = eval.evaluate(Candidate::clipped(vec![11.0], &space)).unwrap();
        let far = eval.evaluate(Candidate::clipped(vec![15.0], &space)).unwrap();

        // All three clip to the same depth; only the penalty differs.
        assert_eq!(slightly.genes(), inside.genes());
        assert!(slightly.fitness() > inside.fitness());
        assert!(far.fitness() > slightly.fitness());
    }

    #[test]
    fn rejects_non_positive_weights() {
        let weights = FitnessWeights {
            secondary: 0.0,
            ..FitnessWeights::default()
        };
        match FitnessEvaluator::new(&Linear, &[], 4.0, weights) {
            Err(AwjError::Config(msg)) => assert!(msg.contains("secondary")),
            Err(e) => panic!("expected Config error, got {e:?}"),
            Ok(_) => panic!("expected Config error"),
        }
    }

    #[test]
    fn rejects_non_positive_depth() {
        for depth in [0.0, -3.0, f64::NAN] {
            let result = FitnessEvaluator::new(&Linear, &[], depth, FitnessWeights::default());
            assert!(matches!(
                result,
                Err(AwjError::Validation(ValidationError::NonPositiveDepth { .. }))
            ));
        }
    }

    #[test]
    fn rejects_wrong_fixed_input_count() {
        let model = AbrasiveJetModel::default();
        let result = FitnessEvaluator::new(&model, &[0.76], 10.0, FitnessWeights::default());
        assert!(matches!(
            result,
            Err(AwjError::Validation(ValidationError::FixedInputCount {
                expected: 2,
                actual: 1
            }))
        ));
    }

    #[test]
    fn non_finite_prediction_is_a_model_error() {
        let eval = FitnessEvaluator::new(&Broken, &[], 4.0, FitnessWeights::default()).unwrap();
        let result = eval.evaluate(Candidate::clipped(vec![3.0], &line_space()));
        assert!(matches!(
            result,
            Err(AwjError::Model(ModelError::NonFinite { .. }))
        ));
    }
}
