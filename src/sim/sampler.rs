//! Coefficient uncertainty sampling.
//!
//! The "many model versions" idea is made concrete here: each draw is one
//! perturbed-but-plausible coefficient set from the fit's uncertainty
//! representation.
//!
//! - `Covariance`: multivariate normal around the point estimate. The draw is
//!   `θ + L·z` with `L` the lower Cholesky factor of the covariance and `z`
//!   i.i.d. standard normal. The factorization happens once, at sampler
//!   construction, not per draw.
//! - `Ensemble`: uniform resampling from the precomputed draws.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::SimError;
use crate::model::{CoefficientSet, FittedModel, Uncertainty};

#[derive(Debug)]
enum SamplerKind {
    /// Point estimate (flattened) + Cholesky factor of the covariance.
    Normal {
        mean: DVector<f64>,
        chol: Cholesky<f64, Dyn>,
    },
    Ensemble,
}

/// Draws coefficient realizations for one fitted model.
///
/// Holds no state between draws other than what the caller's RNG carries, so
/// a fixed seed reproduces the draw sequence exactly.
#[derive(Debug)]
pub struct CoefficientSampler<'m> {
    model: &'m FittedModel,
    kind: SamplerKind,
}

impl<'m> CoefficientSampler<'m> {
    /// Prepare a sampler for the model's uncertainty representation.
    ///
    /// Fails with `InsufficientUncertaintyData` when the model carries no
    /// representation, an empty ensemble, or a covariance that is not
    /// positive definite (Cholesky fails).
    pub fn new(model: &'m FittedModel) -> Result<Self, SimError> {
        let kind = match model.uncertainty() {
            Uncertainty::Covariance(cov) => {
                let chol = cholesky_of(cov)?;
                SamplerKind::Normal {
                    mean: model.coef().flatten(),
                    chol,
                }
            }
            Uncertainty::Ensemble(draws) => {
                if draws.is_empty() {
                    return Err(SimError::InsufficientUncertaintyData(
                        "coefficient ensemble is empty".to_string(),
                    ));
                }
                SamplerKind::Ensemble
            }
            Uncertainty::None => {
                return Err(SimError::InsufficientUncertaintyData(
                    "model carries point estimates only".to_string(),
                ));
            }
        };
        Ok(Self { model, kind })
    }

    /// Draw one coefficient realization.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> CoefficientSet {
        match &self.kind {
            SamplerKind::Normal { mean, chol } => {
                let z = DVector::from_fn(mean.len(), |_, _| rng.sample(StandardNormal));
                let theta = mean + chol.l() * z;
                CoefficientSet::unflatten(
                    &theta,
                    self.model.coef().n_alternatives(),
                    self.model.coef().n_predictors(),
                )
            }
            SamplerKind::Ensemble => {
                let Uncertainty::Ensemble(draws) = self.model.uncertainty() else {
                    unreachable!("sampler kind checked at construction");
                };
                draws[rng.gen_range(0..draws.len())].clone()
            }
        }
    }
}

fn cholesky_of(cov: &DMatrix<f64>) -> Result<Cholesky<f64, Dyn>, SimError> {
    Cholesky::new(cov.clone()).ok_or_else(|| {
        SimError::InsufficientUncertaintyData(
            "coefficient covariance is not positive definite".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OutcomeSet;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn model_with(uncertainty: Uncertainty) -> FittedModel {
        FittedModel::new(
            OutcomeSet::new(["A", "B", "C"]).unwrap(),
            vec!["x".to_string()],
            CoefficientSet::new(
                DVector::from_row_slice(&[0.5, -0.5]),
                DMatrix::from_row_slice(2, 1, &[1.0, -1.0]),
            )
            .unwrap(),
            uncertainty,
        )
        .unwrap()
    }

    #[test]
    fn point_only_model_cannot_be_sampled() {
        let model = model_with(Uncertainty::None);
        let err = CoefficientSampler::new(&model).unwrap_err();
        assert!(matches!(err, SimError::InsufficientUncertaintyData(_)));
    }

    #[test]
    fn non_positive_definite_covariance_is_rejected() {
        // dim = 2 alternatives * (1 predictor + intercept) = 4.
        let mut cov = DMatrix::identity(4, 4);
        cov[(0, 0)] = -1.0;
        let model = model_with(Uncertainty::Covariance(cov));
        let err = CoefficientSampler::new(&model).unwrap_err();
        assert!(matches!(err, SimError::InsufficientUncertaintyData(_)));
    }

    #[test]
    fn tiny_covariance_draws_stay_near_the_point_estimate() {
        let cov = DMatrix::identity(4, 4) * 1e-18;
        let model = model_with(Uncertainty::Covariance(cov));
        let sampler = CoefficientSampler::new(&model).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let draw = sampler.draw(&mut rng);
        let diff = (draw.flatten() - model.coef().flatten()).abs().max();
        assert!(diff < 1e-6);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let model = model_with(Uncertainty::Covariance(DMatrix::identity(4, 4)));
        let sampler = CoefficientSampler::new(&model).unwrap();

        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(sampler.draw(&mut a), sampler.draw(&mut b));
        }
    }

    #[test]
    fn ensemble_draws_come_from_the_ensemble() {
        let member = CoefficientSet::new(
            DVector::from_row_slice(&[9.0, 9.0]),
            DMatrix::from_row_slice(2, 1, &[9.0, 9.0]),
        )
        .unwrap();
        let model = model_with(Uncertainty::Ensemble(vec![member.clone()]));
        let sampler = CoefficientSampler::new(&model).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.draw(&mut rng), member);
    }

    #[test]
    fn empty_ensemble_is_rejected() {
        let model = model_with(Uncertainty::Ensemble(Vec::new()));
        assert!(matches!(
            CoefficientSampler::new(&model),
            Err(SimError::InsufficientUncertaintyData(_))
        ));
    }
}
