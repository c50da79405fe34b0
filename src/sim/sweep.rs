//! Ribbon sweep: probability curves across one variable's grid.
//!
//! The sweep holds every covariate at the baseline case and overrides the
//! swept variable with each grid value in turn, predicting with the
//! point-estimate coefficients only. No uncertainty sampling and no RNG:
//! a sweep is fully deterministic.
//!
//! The grid is the caller's responsibility (explicit breakpoints from the
//! variable table, or an evenly spaced range from `sim::grid`); this engine
//! only evaluates the grid it is given.

use rayon::prelude::*;

use crate::domain::{CaseDescription, SweepPoint, SweepResult};
use crate::error::SimError;
use crate::model::{FittedModel, predict};
use crate::present::case_to_covariates;
use crate::vars::VariableRegistry;

/// Evaluate point-estimate probability curves along `grid` for one variable.
///
/// `sweep_var` must be flagged as an axis candidate (`NonAxisVariable`
/// otherwise) and must be a model predictor. `grid` is an ordered sequence
/// of display-space values with at least 2 points (`EmptyGrid` otherwise);
/// output rows are in grid order, one per grid point.
pub fn sweep(
    baseline: &CaseDescription,
    sweep_var: &str,
    grid: &[f64],
    registry: &VariableRegistry,
    model: &FittedModel,
) -> Result<SweepResult, SimError> {
    if !registry.is_axis_candidate(sweep_var)? {
        return Err(SimError::NonAxisVariable(sweep_var.to_string()));
    }
    if grid.len() < 2 {
        return Err(SimError::EmptyGrid(grid.len()));
    }
    let sweep_idx = model.predictor_index(sweep_var).ok_or_else(|| {
        SimError::DimensionMismatch(format!(
            "sweep variable `{sweep_var}` is not a model predictor"
        ))
    })?;

    let baseline_cov = case_to_covariates(baseline, registry, model)?;

    let points: Vec<SweepPoint> = grid
        .par_iter()
        .map(|&x| {
            let model_x = registry.to_model(sweep_var, x)?;
            let mut cov = baseline_cov.clone();
            cov[sweep_idx] = model_x;
            let probabilities = predict(model.coef(), &cov)?;
            Ok(SweepPoint { x, probabilities })
        })
        .collect::<Result<_, SimError>>()?;

    Ok(SweepResult {
        variable: sweep_var.to_string(),
        outcomes: model.outcomes().clone(),
        points,
    })
}
