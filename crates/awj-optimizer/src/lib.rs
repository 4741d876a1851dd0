//! # awj-optimizer
//!
//! Genetic search for abrasive water-jet process parameters.
//!
//! Given bounds for pump pressure, abrasive flow and traverse rate, the
//! measured nozzle geometry and a target depth of cut, the optimizer evolves
//! a population of parameter vectors against a depth model and returns the
//! best candidate found together with how and why the search stopped.
//!
//! ```no_run
//! use awj_optimizer::run_genetic_algorithm;
//!
//! let rec = run_genetic_algorithm(
//!     [
//!         ("P (MPa)", [100.0, 400.0]),
//!         ("mf (kg/min)", [0.1, 1.0]),
//!         ("v (mm/min)", [100.0, 5000.0]),
//!     ],
//!     &[0.76, 0.24],
//!     10.0,
//! )?;
//! println!("P={:.2} mf={:.3} v={:.2}", rec.pressure, rec.flow_rate, rec.traverse_rate);
//! # Ok::<(), awj_optimizer::AwjError>(())
//! ```

mod config;
mod crossover;
mod engine;
mod fitness;
mod model;
mod mutation;
mod optimizer;
mod population;
mod selection;

pub use awj_types::{
    AwjError, AwjResult, FixedInputs, GenerationStats, ModelError, NamedValue,
    OptimizationResult, ParameterSpace, ParameterSpec, ProcessParameters, Recommendation,
    TerminationReason, ValidationError,
};
pub use config::OptimizerConfig;
pub use crossover::blend_crossover;
pub use engine::{EngineOutcome, PopulationEngine};
pub use fitness::{ErrorMetric, FitnessEvaluator, FitnessWeights};
pub use model::{
    AbrasiveJetCoefficients, AbrasiveJetModel, DepthModel, ModelParameter, Prediction,
};
pub use mutation::gaussian_mutation;
pub use optimizer::{run_genetic_algorithm, OptimizationRequest, Optimizer};
pub use population::{initialize_population, Candidate, EvaluatedCandidate, Population};
pub use selection::{select_pair, tournament_selection};
