//! Mutation operators.

use rand::Rng;
use rand_distr::StandardNormal;

use awj_types::ParameterSpace;

use crate::population::Candidate;

/// Per-dimension Gaussian mutation.
///
/// Each gene is perturbed with probability `probability` by
/// `N(0, (scale * range)^2)` and the result is clipped to the bounds. A
/// candidate with no perturbed gene is returned unchanged.
pub fn gaussian_mutation<R: Rng + ?Sized>(
    candidate: &Candidate,
    probability: f64,
    scale: f64,
    space: &ParameterSpace,
    rng: &mut R,
) -> Candidate {
    let mut genes = candidate.genes().to_vec();
    let mut mutated = false;

    for (gene, spec) in genes.iter_mut().zip(space.iter()) {
        if rng.random::<f64>() < probability {
            let z: f64 = rng.sample(StandardNormal);
            *gene += z * scale * spec.range();
            mutated = true;
        }
    }

    if mutated {
        Candidate::clipped(genes, space)
    } else {
        candidate.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn space() -> ParameterSpace {
        ParameterSpace::new()
            .add("pressure", 100.0, 400.0, "MPa")
            .add("flow_rate", 0.1, 1.0, "kg/min")
            .add("traverse_rate", 100.0, 5000.0, "mm/min")
    }

    #[test]
    fn mutants_stay_in_bounds() {
        let space = space();
        let edge = Candidate::clipped(vec![400.0, 0.1, 5000.0], &space);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let m = gaussian_mutation(&edge, 1.0, 0.5, &space, &mut rng);
            assert!(space.contains(m.genes()), "out of bounds: {:?}", m.genes());
        }
    }

    #[test]
    fn zero_probability_is_identity() {
        let space = space();
        let c = Candidate::clipped(vec![250.0, 0.5, 1000.0], &space);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(gaussian_mutation(&c, 0.0, 0.1, &space, &mut rng), c);
    }

    #[test]
    fn step_size_scales_with_range() {
        let space = space();
        let c = Candidate::clipped(vec![250.0, 0.55, 2550.0], &space);
        let mut rng = StdRng::seed_from_u64(21);
        let mut moved = [0.0f64; 3];
        let n = 400;
        for _ in 0..n {
            let m = gaussian_mutation(&c, 1.0, 0.01, &space, &mut rng);
            for d in 0..3 {
                moved[d] += (m.genes()[d] - c.genes()[d]).abs() / space.parameters[d].range();
            }
        }
        // Mean |N(0, 0.01^2)| is about 0.008 of the range in every dimension.
        for total in moved {
            let mean = total / n as f64;
            assert!(mean > 0.005 && mean < 0.011, "mean step = {mean}");
        }
    }

    #[test]
    fn overshoot_is_recorded_as_violation() {
        let space = space();
        let edge = Candidate::clipped(vec![400.0, 1.0, 5000.0], &space);
        let mut rng = StdRng::seed_from_u64(2);
        let saw_violation = (0..100)
            .map(|_| gaussian_mutation(&edge, 1.0, 0.2, &space, &mut rng))
            .any(|m| m.violation() > 0.0);
        assert!(saw_violation);
    }
}
