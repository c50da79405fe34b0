//! Dot-cloud simulation for a fixed case.
//!
//! One simulate call:
//!
//! 1. convert the case to a model-space covariate vector (adapter)
//! 2. draw `draw_count` coefficient realizations from one RNG stream
//! 3. predict outcome probabilities for each draw
//!
//! Draws are taken sequentially so a fixed seed reproduces the ensemble
//! bit-for-bit; prediction fans out over the rayon pool with an
//! order-preserving collect. Any transform or prediction failure aborts the
//! whole call; a partial ensemble is never returned.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::{CaseDescription, SimulationResult};
use crate::error::SimError;
use crate::model::{FittedModel, predict};
use crate::present::case_to_covariates;
use crate::sim::sampler::CoefficientSampler;
use crate::vars::VariableRegistry;

/// Draw count used when the caller does not specify one.
pub const DEFAULT_DRAW_COUNT: usize = 1000;

/// Simulate the outcome-probability ensemble for one case.
///
/// `draw_count` must be >= 1 (`InvalidDrawCount` otherwise). With
/// `seed: Some(s)` the result is reproducible; with `None` each call draws
/// from a fresh entropy-seeded generator. Each call owns its RNG, so
/// concurrent simulations never share random state.
pub fn simulate(
    case: &CaseDescription,
    registry: &VariableRegistry,
    model: &FittedModel,
    draw_count: usize,
    seed: Option<u64>,
) -> Result<SimulationResult, SimError> {
    if draw_count == 0 {
        return Err(SimError::InvalidDrawCount(draw_count));
    }

    let covariates = case_to_covariates(case, registry, model)?;
    let sampler = CoefficientSampler::new(model)?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    // Sequential draws keep the RNG stream deterministic; the per-draw
    // predictions are independent and run in parallel.
    let coefficient_draws: Vec<_> = (0..draw_count).map(|_| sampler.draw(&mut rng)).collect();

    let draws: Vec<Vec<f64>> = coefficient_draws
        .par_iter()
        .map(|coef| predict(coef, &covariates))
        .collect::<Result<_, _>>()?;

    Ok(SimulationResult {
        outcomes: model.outcomes().clone(),
        draws,
    })
}
