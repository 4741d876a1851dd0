//! Generational engine: selection, crossover, mutation, elitism and the
//! termination policy.
//!
//! All random draws come from the `rng` handed to [`PopulationEngine::initialize`]
//! and [`PopulationEngine::step`], in a fixed order. Fitness evaluation never
//! draws, so evaluating a generation in parallel leaves the stream untouched.

use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

use awj_types::{AwjResult, GenerationStats, ParameterSpace, TerminationReason};

use crate::config::OptimizerConfig;
use crate::crossover::blend_crossover;
use crate::fitness::FitnessEvaluator;
use crate::model::DepthModel;
use crate::mutation::gaussian_mutation;
use crate::population::{initialize_population, Candidate, EvaluatedCandidate, Population};
use crate::selection::select_pair;

/// Final state of a finished engine.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub best: EvaluatedCandidate,
    pub found_at_generation: usize,
    pub generations_run: usize,
    pub evaluations: usize,
    pub termination: TerminationReason,
    pub history: Vec<GenerationStats>,
}

pub struct PopulationEngine<'a, M: DepthModel + ?Sized> {
    space: &'a ParameterSpace,
    evaluator: &'a FitnessEvaluator<'a, M>,
    config: &'a OptimizerConfig,
    deadline: Option<Instant>,
    population: Population,
    generation: usize,
    best: EvaluatedCandidate,
    best_generation: usize,
    /// Fitness at the last meaningful improvement.
    reference_fitness: f64,
    stagnant_generations: usize,
    evaluations: usize,
    history: Vec<GenerationStats>,
}

impl<'a, M: DepthModel + ?Sized> PopulationEngine<'a, M> {
    /// Draw and evaluate generation 0.
    pub fn initialize<R: Rng + ?Sized>(
        space: &'a ParameterSpace,
        evaluator: &'a FitnessEvaluator<'a, M>,
        config: &'a OptimizerConfig,
        deadline: Option<Instant>,
        rng: &mut R,
    ) -> AwjResult<Self> {
        config.validate()?;
        space.validate()?;

        let candidates = initialize_population(space, config.population_size, rng);
        let members = evaluate_all(evaluator, candidates, config.parallel_evaluation)?;
        let population = Population::new(members);

        let best = population
            .best()
            .cloned()
            .ok_or_else(|| awj_types::internal_error!("initial population is empty"))?;
        let history = vec![population.stats(0, best.fitness(), space)];

        debug!(
            "Generation 0: best fitness {:.6}, depth {:.4}",
            best.fitness(),
            best.depth()
        );

        Ok(Self {
            space,
            evaluator,
            config,
            deadline,
            generation: 0,
            best_generation: 0,
            reference_fitness: best.fitness(),
            stagnant_generations: 0,
            evaluations: population.len(),
            history,
            best,
            population,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best candidate seen in any generation so far.
    pub fn best(&self) -> &EvaluatedCandidate {
        &self.best
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn stagnant_generations(&self) -> usize {
        self.stagnant_generations
    }

    /// Produce and evaluate the next generation.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AwjResult<()> {
        let config = self.config;
        let elite: Vec<EvaluatedCandidate> = self
            .population
            .elite(config.elite_count)
            .into_iter()
            .cloned()
            .collect();

        let needed = config.population_size - elite.len();
        let mut children: Vec<Candidate> = Vec::with_capacity(needed);
        while children.len() < needed {
            let (i, j) = select_pair(&self.population, config.tournament_size, rng);
            let (c1, c2) = blend_crossover(
                self.population.get(i).candidate(),
                self.population.get(j).candidate(),
                config.crossover_probability,
                self.space,
                rng,
            );
            for child in [c1, c2] {
                if children.len() < needed {
                    children.push(gaussian_mutation(
                        &child,
                        config.mutation_probability,
                        config.mutation_scale,
                        self.space,
                        rng,
                    ));
                }
            }
        }

        let evaluated = evaluate_all(self.evaluator, children, config.parallel_evaluation)?;
        self.evaluations += evaluated.len();

        let mut members = elite;
        members.extend(evaluated);
        self.population = Population::new(members);
        self.generation += 1;

        if let Some(gen_best) = self.population.best() {
            if gen_best.rank(&self.best).is_lt() {
                self.best = gen_best.clone();
                self.best_generation = self.generation;
            }
        }

        if self.reference_fitness - self.best.fitness() > config.stagnation_epsilon {
            self.reference_fitness = self.best.fitness();
            self.stagnant_generations = 0;
        } else {
            self.stagnant_generations += 1;
        }

        let stats = self
            .population
            .stats(self.generation, self.best.fitness(), self.space);
        debug!(
            "Generation {}: best {:.6}, generation best {:.6}, mean {:.6}, diversity {:.4}",
            self.generation,
            stats.best_ever,
            stats.generation_best,
            stats.mean_fitness,
            stats.diversity
        );
        self.history.push(stats);
        Ok(())
    }

    /// First termination condition that holds, if any.
    pub fn check_termination(&self) -> Option<TerminationReason> {
        if let Some(threshold) = self.config.fitness_threshold {
            if self.best.fitness() < threshold {
                return Some(TerminationReason::Threshold);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(TerminationReason::Deadline);
            }
        }
        if self.generation >= self.config.max_generations {
            return Some(TerminationReason::MaxGenerations);
        }
        if self.stagnant_generations >= self.config.stagnation_window {
            return Some(TerminationReason::Stagnation);
        }
        None
    }

    /// Step until a termination condition holds.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> AwjResult<EngineOutcome> {
        loop {
            if let Some(reason) = self.check_termination() {
                return Ok(self.finish(reason));
            }
            self.step(rng)?;
        }
    }

    fn finish(self, termination: TerminationReason) -> EngineOutcome {
        match termination {
            TerminationReason::Deadline => warn!(
                "Deadline reached after {} generations; returning best so far",
                self.generation
            ),
            TerminationReason::Stagnation => warn!(
                "No improvement over {} generations; stopping at generation {}",
                self.stagnant_generations, self.generation
            ),
            _ => {}
        }
        info!(
            "Search finished ({}) after {} generations: best fitness {:.6} from generation {}",
            termination,
            self.generation,
            self.best.fitness(),
            self.best_generation
        );
        EngineOutcome {
            best: self.best,
            found_at_generation: self.best_generation,
            generations_run: self.generation,
            evaluations: self.evaluations,
            termination,
            history: self.history,
        }
    }
}

/// Evaluate candidates, preserving their order.
fn evaluate_all<M: DepthModel + ?Sized>(
    evaluator: &FitnessEvaluator<'_, M>,
    candidates: Vec<Candidate>,
    parallel: bool,
) -> AwjResult<Vec<EvaluatedCandidate>> {
    if parallel {
        candidates
            .into_par_iter()
            .map(|c| evaluator.evaluate(c))
            .collect()
    } else {
        candidates
            .into_iter()
            .map(|c| evaluator.evaluate(c))
            .collect()
    }
}
