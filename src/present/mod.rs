//! Presentation adapter: display space ↔ model space.
//!
//! The engines work entirely in model space; callers (UI, CLI, batch files)
//! speak display space. This module is the thin mapping between the two,
//! built on the variable registry.
//!
//! Slider consistency rule: slider-driven inputs are rounded to the
//! variable's granularity *before* the transform to model space, so the
//! value the user sees on a slider and the value fed to the model agree at
//! the displayed precision.

use nalgebra::DVector;

use crate::domain::CaseDescription;
use crate::error::SimError;
use crate::model::FittedModel;
use crate::vars::{VariableRegistry, VariableSpec};

/// Round `value` to a multiple of `granularity` (ties away from zero, as
/// `f64::round` does).
pub fn round_to_granularity(value: f64, granularity: f64) -> f64 {
    (value / granularity).round() * granularity
}

/// Normalize one display-space input for a variable.
///
/// Slider candidates are rounded at their granularity; other variables pass
/// through unchanged.
pub fn normalize_display_input(
    spec: &VariableSpec,
    registry: &VariableRegistry,
    value: f64,
) -> Result<f64, SimError> {
    if spec.slider {
        Ok(round_to_granularity(value, registry.rounding(&spec.id)?))
    } else {
        Ok(value)
    }
}

/// Convert a display-space case into the model-space covariate vector, in
/// the fitted model's predictor order.
///
/// Every predictor the model expects must be present in the case
/// (`DimensionMismatch` otherwise); every value passes through slider
/// rounding and the variable's transform. Variables in the case that the
/// model does not use are ignored.
pub fn case_to_covariates(
    case: &CaseDescription,
    registry: &VariableRegistry,
    model: &FittedModel,
) -> Result<DVector<f64>, SimError> {
    let mut out = DVector::zeros(model.predictors().len());
    for (j, name) in model.predictors().iter().enumerate() {
        let display = case.get(name).ok_or_else(|| {
            SimError::DimensionMismatch(format!("case is missing required predictor `{name}`"))
        })?;
        let spec = registry.get(name)?;
        let display = normalize_display_input(spec, registry, display)?;
        out[j] = registry.to_model(name, display)?;
    }
    Ok(out)
}

/// Convert a model-space covariate vector back into a display-space case,
/// for reporting and plotting handoff.
pub fn covariates_to_display(
    covariates: &DVector<f64>,
    registry: &VariableRegistry,
    model: &FittedModel,
) -> Result<CaseDescription, SimError> {
    if covariates.len() != model.predictors().len() {
        return Err(SimError::DimensionMismatch(format!(
            "covariate vector has {} entries, model has {} predictors",
            covariates.len(),
            model.predictors().len()
        )));
    }
    let mut case = CaseDescription::new();
    for (j, name) in model.predictors().iter().enumerate() {
        case.set(name.clone(), registry.to_display(name, covariates[j])?);
    }
    Ok(case)
}
