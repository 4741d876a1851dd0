//! Crossover operators.

use rand::Rng;

use awj_types::ParameterSpace;

use crate::population::Candidate;

/// Arithmetic blend crossover.
///
/// With probability `probability` draws one mixing ratio `a ~ U[0, 1]` for the
/// offspring pair:
///
/// c1 = a * p1 + (1 - a) * p2
/// c2 = (1 - a) * p1 + a * p2
///
/// Otherwise the parents are copied unchanged.
pub fn blend_crossover<R: Rng + ?Sized>(
    parent1: &Candidate,
    parent2: &Candidate,
    probability: f64,
    space: &ParameterSpace,
    rng: &mut R,
) -> (Candidate, Candidate) {
    if rng.random::<f64>() >= probability {
        return (parent1.clone(), parent2.clone());
    }

    let a: f64 = rng.random();
    let (child1, child2): (Vec<f64>, Vec<f64>) = parent1
        .genes()
        .iter()
        .zip(parent2.genes())
        .map(|(&p1, &p2)| (a * p1 + (1.0 - a) * p2, (1.0 - a) * p1 + a * p2))
        .unzip();

    (
        Candidate::clipped(child1, space),
        Candidate::clipped(child2, space),
    )
}
