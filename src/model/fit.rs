//! The fitted model: point estimate plus uncertainty representation.

use nalgebra::DMatrix;

use crate::domain::OutcomeSet;
use crate::error::SimError;
use crate::model::coef::CoefficientSet;

/// How estimation uncertainty is represented.
///
/// `Covariance` is the documented default: draws are multivariate normal
/// around the point estimate using the coefficient covariance (layout as in
/// [`CoefficientSet::flatten`]). `Ensemble` carries precomputed draws, e.g.
/// bootstrap refits, and is resampled uniformly. `None` supports
/// point-estimate-only workflows (sweeps work, simulation does not).
#[derive(Debug, Clone, PartialEq)]
pub enum Uncertainty {
    Covariance(DMatrix<f64>),
    Ensemble(Vec<CoefficientSet>),
    None,
}

/// A fitted multinomial logit, read-only to the engine.
///
/// Owns the outcome set, the ordered predictor names, the coefficient point
/// estimate, and the uncertainty representation. A single instance may be
/// shared across concurrent simulation requests.
#[derive(Debug, Clone)]
pub struct FittedModel {
    outcomes: OutcomeSet,
    predictors: Vec<String>,
    coef: CoefficientSet,
    uncertainty: Uncertainty,
}

impl FittedModel {
    pub fn new(
        outcomes: OutcomeSet,
        predictors: Vec<String>,
        coef: CoefficientSet,
        uncertainty: Uncertainty,
    ) -> Result<Self, SimError> {
        if coef.n_alternatives() != outcomes.len() - 1 {
            return Err(SimError::InvalidModel(format!(
                "{} outcome categories need {} coefficient rows, got {}",
                outcomes.len(),
                outcomes.len() - 1,
                coef.n_alternatives()
            )));
        }
        if coef.n_predictors() != predictors.len() {
            return Err(SimError::InvalidModel(format!(
                "{} predictors named but {} weight columns",
                predictors.len(),
                coef.n_predictors()
            )));
        }
        for (i, name) in predictors.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SimError::InvalidModel("empty predictor name".to_string()));
            }
            if predictors[..i].contains(name) {
                return Err(SimError::InvalidModel(format!(
                    "duplicate predictor `{name}`"
                )));
            }
        }

        match &uncertainty {
            Uncertainty::Covariance(cov) => {
                let d = coef.dim();
                if cov.nrows() != d || cov.ncols() != d {
                    return Err(SimError::InvalidModel(format!(
                        "covariance is {}x{}, expected {d}x{d}",
                        cov.nrows(),
                        cov.ncols()
                    )));
                }
                if cov.iter().any(|v| !v.is_finite()) {
                    return Err(SimError::InvalidModel(
                        "non-finite covariance entry".to_string(),
                    ));
                }
            }
            Uncertainty::Ensemble(draws) => {
                for (i, d) in draws.iter().enumerate() {
                    if d.n_alternatives() != coef.n_alternatives()
                        || d.n_predictors() != coef.n_predictors()
                    {
                        return Err(SimError::InvalidModel(format!(
                            "ensemble draw {i} has shape ({}, {}), expected ({}, {})",
                            d.n_alternatives(),
                            d.n_predictors(),
                            coef.n_alternatives(),
                            coef.n_predictors()
                        )));
                    }
                }
            }
            Uncertainty::None => {}
        }

        Ok(Self {
            outcomes,
            predictors,
            coef,
            uncertainty,
        })
    }

    pub fn outcomes(&self) -> &OutcomeSet {
        &self.outcomes
    }

    /// Predictor names, in weight-column order.
    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    /// The coefficient point estimate.
    pub fn coef(&self) -> &CoefficientSet {
        &self.coef
    }

    pub fn uncertainty(&self) -> &Uncertainty {
        &self.uncertainty
    }

    pub fn predictor_index(&self, name: &str) -> Option<usize> {
        self.predictors.iter().position(|p| p == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn outcomes() -> OutcomeSet {
        OutcomeSet::new(["Reunification", "Adoption", "Guardianship", "Emancipation"]).unwrap()
    }

    fn coef_3x2() -> CoefficientSet {
        CoefficientSet::new(
            DVector::from_row_slice(&[0.1, 0.2, 0.3]),
            DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, -1.0, 0.5]),
        )
        .unwrap()
    }

    #[test]
    fn coefficient_rows_must_match_outcome_count() {
        let err = FittedModel::new(
            OutcomeSet::new(["A", "B"]).unwrap(),
            vec!["x".to_string(), "y".to_string()],
            coef_3x2(),
            Uncertainty::None,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));
    }

    #[test]
    fn covariance_shape_is_validated() {
        let err = FittedModel::new(
            outcomes(),
            vec!["x".to_string(), "y".to_string()],
            coef_3x2(),
            Uncertainty::Covariance(DMatrix::zeros(4, 4)),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));

        // dim = 3 alternatives * (2 predictors + intercept) = 9.
        let ok = FittedModel::new(
            outcomes(),
            vec!["x".to_string(), "y".to_string()],
            coef_3x2(),
            Uncertainty::Covariance(DMatrix::identity(9, 9)),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn duplicate_predictors_are_rejected() {
        let err = FittedModel::new(
            outcomes(),
            vec!["x".to_string(), "x".to_string()],
            coef_3x2(),
            Uncertainty::None,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));
    }
}
