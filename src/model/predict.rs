//! The multinomial link: coefficients + covariates → probability simplex.

use nalgebra::DVector;

use crate::error::SimError;
use crate::model::coef::CoefficientSet;

/// Predict outcome probabilities for one covariate vector.
///
/// For each non-reference outcome `a`, the linear score is
/// `intercept_a + w_a · x`; the reference category scores 0. Scores are
/// max-subtracted before exponentiating so large magnitudes cannot overflow,
/// then normalized into a simplex. Output is in outcome order (reference
/// first), with length `k`.
pub fn predict(coef: &CoefficientSet, covariates: &DVector<f64>) -> Result<Vec<f64>, SimError> {
    if covariates.len() != coef.n_predictors() {
        return Err(SimError::DimensionMismatch(format!(
            "covariate vector has {} entries, coefficient set expects {}",
            covariates.len(),
            coef.n_predictors()
        )));
    }

    let k = coef.n_alternatives() + 1;
    let alt_scores = coef.intercepts() + coef.weights() * covariates;
    let mut scores = Vec::with_capacity(k);
    scores.push(0.0);
    scores.extend(alt_scores.iter().copied());

    // Max-subtraction keeps exp() in range even for extreme scores; the
    // shifted maximum exponentiates to exactly 1, so the normalizer is
    // always >= 1.
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    let mut probs = Vec::with_capacity(k);
    for s in &scores {
        let e = (s - max).exp();
        sum += e;
        probs.push(e);
    }
    for p in &mut probs {
        *p /= sum;
    }
    Ok(probs)
}
