//! Read/write the portable model JSON document.
//!
//! The model file is the contract between the fitting side (R, Python, or
//! another Rust tool) and this engine. It carries:
//!
//! - the ordered outcome labels (first = reference category)
//! - predictor names in weight-column order
//! - the coefficient point estimate (intercepts + weight rows)
//! - an uncertainty representation: a full coefficient covariance
//!   (outcome-major, intercept-first layout) and/or a precomputed ensemble
//! - the per-variable UI metadata table (transforms, roles, rounding, axis
//!   breakpoints)
//!
//! The serde schema lives here, separate from the domain types, so file
//! format concerns never leak into the engines. Reading converts into
//! validated domain values; every shape error is reported with the
//! offending field.

use std::fs::File;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::OutcomeSet;
use crate::error::SimError;
use crate::model::{CoefficientSet, FittedModel, Uncertainty};
use crate::vars::{AxisBreaks, Transform, VariableRegistry, VariableSpec};

/// Top-level model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    /// Producing tool tag, informational only.
    pub tool: String,
    pub outcomes: Vec<String>,
    pub predictors: Vec<String>,
    pub intercepts: Vec<f64>,
    /// One row per non-reference outcome, one column per predictor.
    pub weights: Vec<Vec<f64>>,
    /// Coefficient covariance, `(k-1)(p+1)` square, outcome-major with the
    /// intercept first within each outcome block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covariance: Option<Vec<Vec<f64>>>,
    /// Precomputed coefficient draws (e.g. bootstrap refits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensemble: Option<Vec<EnsembleEntry>>,
    pub variables: Vec<VariableEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleEntry {
    pub intercepts: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableEntry {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub slider: bool,
    #[serde(default)]
    pub facet: bool,
    #[serde(default)]
    pub axis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<f64>,
    #[serde(default)]
    pub transform: TransformEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_breaks: Option<AxisBreaksEntry>,
}

/// Serialized transform kinds.
///
/// The `Custom` escape hatch has no file representation on purpose: a pure
/// function pair can only be registered in code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransformEntry {
    #[default]
    Identity,
    Negate,
    Exp,
    Expm1,
    Affine {
        scale: f64,
        offset: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisBreaksEntry {
    pub breaks: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl From<TransformEntry> for Transform {
    fn from(value: TransformEntry) -> Self {
        match value {
            TransformEntry::Identity => Transform::Identity,
            TransformEntry::Negate => Transform::Negate,
            TransformEntry::Exp => Transform::Exp,
            TransformEntry::Expm1 => Transform::Expm1,
            TransformEntry::Affine { scale, offset } => Transform::Affine { scale, offset },
        }
    }
}

impl From<VariableEntry> for VariableSpec {
    fn from(entry: VariableEntry) -> Self {
        VariableSpec {
            id: entry.id,
            display_name: entry.display_name,
            definition: entry.definition,
            slider: entry.slider,
            facet: entry.facet,
            axis: entry.axis,
            rounding: entry.rounding,
            transform: entry.transform.into(),
            axis_breaks: entry.axis_breaks.map(|b| AxisBreaks {
                breaks: b.breaks,
                labels: b.labels,
            }),
        }
    }
}

/// Read and validate a model JSON file.
pub fn read_model_json(path: &Path) -> Result<(VariableRegistry, FittedModel), SimError> {
    let file = File::open(path)
        .map_err(|e| SimError::io(format!("Failed to open model JSON '{}'", path.display()), e))?;
    let doc: ModelFile = serde_json::from_reader(file)
        .map_err(|e| SimError::json(format!("Invalid model JSON '{}'", path.display()), e))?;
    build_model(doc)
}

/// Convert a parsed document into validated domain values.
pub fn build_model(doc: ModelFile) -> Result<(VariableRegistry, FittedModel), SimError> {
    let outcomes = OutcomeSet::new(doc.outcomes)?;
    let coef = coefficient_set(&doc.intercepts, &doc.weights, doc.predictors.len())?;

    // When both representations are present the covariance wins; the
    // ensemble is a fallback format for fits without a usable covariance.
    let uncertainty = match (doc.covariance, doc.ensemble) {
        (Some(cov), _) => Uncertainty::Covariance(covariance_matrix(cov, coef.dim())?),
        (None, Some(entries)) => {
            let draws = entries
                .iter()
                .map(|e| coefficient_set(&e.intercepts, &e.weights, doc.predictors.len()))
                .collect::<Result<Vec<_>, _>>()?;
            Uncertainty::Ensemble(draws)
        }
        (None, None) => Uncertainty::None,
    };

    let registry = VariableRegistry::new(doc.variables.into_iter().map(VariableSpec::from))?;

    // Every predictor must have a registered variable, otherwise cases can
    // never be transformed into model space.
    for name in &doc.predictors {
        if !registry.contains(name) {
            return Err(SimError::InvalidModel(format!(
                "predictor `{name}` has no entry in the variable table"
            )));
        }
    }

    let model = FittedModel::new(outcomes, doc.predictors, coef, uncertainty)?;
    Ok((registry, model))
}

/// Write a model document (the inverse of [`read_model_json`]).
pub fn write_model_json(path: &Path, doc: &ModelFile) -> Result<(), SimError> {
    let file = File::create(path).map_err(|e| {
        SimError::io(format!("Failed to create model JSON '{}'", path.display()), e)
    })?;
    serde_json::to_writer_pretty(file, doc)
        .map_err(|e| SimError::json("Failed to write model JSON".to_string(), e))
}

fn coefficient_set(
    intercepts: &[f64],
    weights: &[Vec<f64>],
    n_predictors: usize,
) -> Result<CoefficientSet, SimError> {
    if weights.len() != intercepts.len() {
        return Err(SimError::InvalidModel(format!(
            "{} intercepts but {} weight rows",
            intercepts.len(),
            weights.len()
        )));
    }
    for (i, row) in weights.iter().enumerate() {
        if row.len() != n_predictors {
            return Err(SimError::InvalidModel(format!(
                "weight row {i} has {} entries, expected {n_predictors}",
                row.len()
            )));
        }
    }
    let flat: Vec<f64> = weights.iter().flatten().copied().collect();
    CoefficientSet::new(
        DVector::from_row_slice(intercepts),
        DMatrix::from_row_slice(intercepts.len(), n_predictors, &flat),
    )
}

fn covariance_matrix(rows: Vec<Vec<f64>>, dim: usize) -> Result<DMatrix<f64>, SimError> {
    if rows.len() != dim {
        return Err(SimError::InvalidModel(format!(
            "covariance has {} rows, expected {dim}",
            rows.len()
        )));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(SimError::InvalidModel(format!(
                "covariance row {i} has {} entries, expected {dim}",
                row.len()
            )));
        }
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(dim, dim, &flat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc_json() -> &'static str {
        r#"{
            "tool": "osim",
            "outcomes": ["Reunification", "Adoption", "Guardianship", "Emancipation"],
            "predictors": ["log_age_eps_begin", "housing_hardship"],
            "intercepts": [-0.3, 0.1, -1.2],
            "weights": [[0.4, -0.2], [-0.1, 0.3], [0.9, 0.1]],
            "variables": [
                {
                    "id": "log_age_eps_begin",
                    "display_name": "Age at episode begin",
                    "definition": "Child's age in years when the episode began.",
                    "slider": true,
                    "axis": true,
                    "rounding": 0.5,
                    "transform": {"kind": "exp"}
                },
                {
                    "id": "housing_hardship",
                    "display_name": "Housing hardship",
                    "slider": true
                }
            ]
        }"#
    }

    #[test]
    fn parses_and_validates_a_minimal_document() {
        let doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        let (registry, model) = build_model(doc).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.is_axis_candidate("log_age_eps_begin").unwrap());
        assert_eq!(model.outcomes().len(), 4);
        assert_eq!(model.predictors().len(), 2);
        assert_eq!(model.uncertainty(), &Uncertainty::None);
    }

    #[test]
    fn covariance_takes_precedence_and_is_shape_checked() {
        let mut doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        // dim = 3 * (2 + 1) = 9.
        doc.covariance = Some((0..9).map(|i| {
            (0..9).map(|j| if i == j { 0.1 } else { 0.0 }).collect()
        }).collect());
        let (_, model) = build_model(doc.clone()).unwrap();
        assert!(matches!(model.uncertainty(), Uncertainty::Covariance(_)));

        doc.covariance = Some(vec![vec![0.1; 3]; 3]);
        assert!(matches!(build_model(doc), Err(SimError::InvalidModel(_))));
    }

    #[test]
    fn ensemble_entries_are_shape_checked() {
        let mut doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        doc.ensemble = Some(vec![EnsembleEntry {
            intercepts: vec![0.0, 0.0, 0.0],
            weights: vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]],
        }]);
        let (_, model) = build_model(doc.clone()).unwrap();
        assert!(matches!(model.uncertainty(), Uncertainty::Ensemble(d) if d.len() == 1));

        doc.ensemble = Some(vec![EnsembleEntry {
            intercepts: vec![0.0],
            weights: vec![vec![0.0, 0.0]],
        }]);
        assert!(matches!(build_model(doc), Err(SimError::InvalidModel(_))));
    }

    #[test]
    fn predictors_without_variable_entries_are_rejected() {
        let mut doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        doc.variables.pop();
        let err = build_model(doc).unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(m) if m.contains("housing_hardship")));
    }

    #[test]
    fn document_round_trips_through_serde() {
        let doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        let text = serde_json::to_string(&doc).unwrap();
        let back: ModelFile = serde_json::from_str(&text).unwrap();

        assert_eq!(back.outcomes, doc.outcomes);
        assert_eq!(back.weights, doc.weights);
        assert_eq!(back.variables.len(), doc.variables.len());
        assert_eq!(back.variables[0].transform, TransformEntry::Exp);
    }

    #[test]
    fn document_round_trips_through_the_filesystem() {
        let doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();

        let path = std::env::temp_dir().join("outcome-sim-test-model.json");
        write_model_json(&path, &doc).unwrap();
        let (registry, model) = read_model_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(registry.len(), 2);
        assert_eq!(model.outcomes().labels()[0], "Reunification");
        assert_eq!(model.coef().n_predictors(), 2);
    }

    #[test]
    fn transform_entry_defaults_to_identity() {
        let doc: ModelFile = serde_json::from_str(sample_doc_json()).unwrap();
        assert_eq!(doc.variables[1].transform, TransformEntry::Identity);
    }
}
