//! Coefficient sets for a multinomial logit.
//!
//! A fit over k outcomes and p predictors carries, for each of the k-1
//! non-reference outcomes, one intercept and one weight per predictor. The
//! reference category has no coefficients (its linear score is zero), which
//! pins the model down and keeps the probability simplex identified.

use nalgebra::{DMatrix, DVector};

use crate::error::SimError;

/// One realization of the model coefficients.
///
/// Either the point estimate or a perturbed draw from the uncertainty
/// representation; both are structurally identical, so prediction code does
/// not care which it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    /// One intercept per non-reference outcome, in outcome order.
    intercepts: DVector<f64>,
    /// `(k-1) x p`: one row per non-reference outcome, one column per
    /// predictor (predictor order is owned by the `FittedModel`).
    weights: DMatrix<f64>,
}

impl CoefficientSet {
    pub fn new(intercepts: DVector<f64>, weights: DMatrix<f64>) -> Result<Self, SimError> {
        if intercepts.len() == 0 {
            return Err(SimError::InvalidModel(
                "coefficient set needs at least one non-reference outcome".to_string(),
            ));
        }
        if weights.nrows() != intercepts.len() {
            return Err(SimError::InvalidModel(format!(
                "{} intercepts but {} weight rows",
                intercepts.len(),
                weights.nrows()
            )));
        }
        if intercepts.iter().any(|v| !v.is_finite())
            || weights.iter().any(|v| !v.is_finite())
        {
            return Err(SimError::InvalidModel(
                "non-finite coefficient value".to_string(),
            ));
        }
        Ok(Self {
            intercepts,
            weights,
        })
    }

    /// Number of non-reference outcomes.
    pub fn n_alternatives(&self) -> usize {
        self.intercepts.len()
    }

    /// Number of predictors (excluding the intercept).
    pub fn n_predictors(&self) -> usize {
        self.weights.ncols()
    }

    pub fn intercepts(&self) -> &DVector<f64> {
        &self.intercepts
    }

    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }

    /// Total coefficient count: `(k-1) * (p + 1)`.
    pub fn dim(&self) -> usize {
        self.n_alternatives() * (self.n_predictors() + 1)
    }

    /// Flatten to a single vector, outcome-major with the intercept first:
    /// `[b0_1, w1_1..wp_1, b0_2, w1_2..wp_2, ...]`.
    ///
    /// This layout defines the row/column order of the coefficient
    /// covariance matrix in the uncertainty representation.
    pub fn flatten(&self) -> DVector<f64> {
        let p = self.n_predictors();
        let mut out = DVector::zeros(self.dim());
        for a in 0..self.n_alternatives() {
            let base = a * (p + 1);
            out[base] = self.intercepts[a];
            for j in 0..p {
                out[base + 1 + j] = self.weights[(a, j)];
            }
        }
        out
    }

    /// Inverse of [`flatten`](Self::flatten) for the same `(k-1, p)` shape.
    pub fn unflatten(theta: &DVector<f64>, n_alternatives: usize, n_predictors: usize) -> Self {
        debug_assert_eq!(theta.len(), n_alternatives * (n_predictors + 1));
        let mut intercepts = DVector::zeros(n_alternatives);
        let mut weights = DMatrix::zeros(n_alternatives, n_predictors);
        for a in 0..n_alternatives {
            let base = a * (n_predictors + 1);
            intercepts[a] = theta[base];
            for j in 0..n_predictors {
                weights[(a, j)] = theta[base + 1 + j];
            }
        }
        Self {
            intercepts,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_round_trips() {
        let coef = CoefficientSet::new(
            DVector::from_row_slice(&[0.5, -1.0, 2.0]),
            DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        )
        .unwrap();

        let theta = coef.flatten();
        assert_eq!(theta.len(), 9);
        // Outcome-major, intercept first.
        assert_eq!(theta[0], 0.5);
        assert_eq!(theta[1], 1.0);
        assert_eq!(theta[3], -1.0);

        let back = CoefficientSet::unflatten(&theta, 3, 2);
        assert_eq!(back, coef);
    }

    #[test]
    fn shape_disagreement_is_rejected() {
        let err = CoefficientSet::new(
            DVector::from_row_slice(&[0.5, -1.0]),
            DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));
    }
}
