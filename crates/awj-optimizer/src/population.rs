//! Candidates, evaluated candidates and the per-generation population.

use rand::Rng;
use std::cmp::Ordering;

use awj_types::{GenerationStats, ParameterSpace};

/// One point in the parameter space, always inside its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    genes: Vec<f64>,
    /// Normalised distance outside the bounds before clipping.
    violation: f64,
}

impl Candidate {
    /// Clip `raw` into `space`, remembering how far outside it was.
    pub fn clipped(raw: Vec<f64>, space: &ParameterSpace) -> Self {
        debug_assert_eq!(raw.len(), space.len(), "candidate does not match its space");
        let mut violation = 0.0;
        let genes = raw
            .into_iter()
            .zip(space.iter())
            .map(|(value, spec)| {
                violation += spec.violation(value);
                spec.clip(value)
            })
            .collect();
        Self { genes, violation }
    }

    /// Uniform draw within every dimension's bounds.
    pub fn random<R: Rng + ?Sized>(space: &ParameterSpace, rng: &mut R) -> Self {
        let genes = space
            .iter()
            .map(|spec| rng.random_range(spec.low..=spec.high))
            .collect();
        Self {
            genes,
            violation: 0.0,
        }
    }

    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    pub fn violation(&self) -> f64 {
        self.violation
    }
}

/// A candidate with its fitness. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCandidate {
    candidate: Candidate,
    fitness: f64,
    depth: f64,
    secondary_cost: f64,
}

impl EvaluatedCandidate {
    pub fn new(candidate: Candidate, fitness: f64, depth: f64, secondary_cost: f64) -> Self {
        Self {
            candidate,
            fitness,
            depth,
            secondary_cost,
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn genes(&self) -> &[f64] {
        self.candidate.genes()
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Raw predicted depth used to compute the fitness.
    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn secondary_cost(&self) -> f64 {
        self.secondary_cost
    }

    /// Fitness first, secondary cost as tie-breaker.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.fitness
            .total_cmp(&other.fitness)
            .then(self.secondary_cost.total_cmp(&other.secondary_cost))
    }
}

/// Draw `size` uniform candidates for generation 0.
pub fn initialize_population<R: Rng + ?Sized>(
    space: &ParameterSpace,
    size: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    (0..size).map(|_| Candidate::random(space, rng)).collect()
}

/// A fixed-size generation of evaluated candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<EvaluatedCandidate>,
}

impl Population {
    pub fn new(members: Vec<EvaluatedCandidate>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[EvaluatedCandidate] {
        &self.members
    }

    pub fn get(&self, index: usize) -> &EvaluatedCandidate {
        &self.members[index]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Index of the best member; ties go to the lower index.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, member) in self.members.iter().enumerate() {
            match best {
                Some(b) if member.rank(&self.members[b]) != Ordering::Less => {}
                _ => best = Some(i),
            }
        }
        best
    }

    pub fn best(&self) -> Option<&EvaluatedCandidate> {
        self.best_index().map(|i| &self.members[i])
    }

    /// The `n` best members, best first, ties by lower index.
    pub fn elite(&self, n: usize) -> Vec<&EvaluatedCandidate> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| self.members[a].rank(&self.members[b]).then(a.cmp(&b)));
        order
            .into_iter()
            .take(n)
            .map(|i| &self.members[i])
            .collect()
    }

    /// Summarise this generation.
    pub fn stats(
        &self,
        generation: usize,
        best_ever: f64,
        space: &ParameterSpace,
    ) -> GenerationStats {
        let n = self.members.len().max(1) as f64;
        let generation_best = self
            .best()
            .map(|m| m.fitness())
            .unwrap_or(f64::INFINITY);
        let mean_fitness = self.members.iter().map(|m| m.fitness()).sum::<f64>() / n;

        let diversity = if space.is_empty() {
            0.0
        } else {
            space
                .iter()
                .enumerate()
                .map(|(d, spec)| {
                    let mean = self.members.iter().map(|m| m.genes()[d]).sum::<f64>() / n;
                    let var = self
                        .members
                        .iter()
                        .map(|m| (m.genes()[d] - mean).powi(2))
                        .sum::<f64>()
                        / n;
                    var.sqrt() / spec.range()
                })
                .sum::<f64>()
                / space.len() as f64
        };

        GenerationStats {
            generation,
            generation_best,
            best_ever,
            mean_fitness,
            diversity,
        }
    }
}
