//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during simulation
//! - exported to JSON/CSV
//! - consumed directly by a plotting collaborator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// The ordered, fixed set of mutually exclusive outcome categories.
///
/// Order is significant: it fixes color assignment and plotting order
/// downstream, and every probability vector the engines produce is in this
/// order. The first label is the reference category of the multinomial link
/// (its linear score is identically zero).
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OutcomeSet {
    labels: Vec<String>,
}

impl OutcomeSet {
    /// Build an outcome set from ordered labels.
    ///
    /// Requires at least two distinct categories (a multinomial needs a
    /// reference plus at least one alternative).
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Result<Self, SimError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() < 2 {
            return Err(SimError::InvalidModel(format!(
                "outcome set needs at least 2 categories, got {}",
                labels.len()
            )));
        }
        for (i, a) in labels.iter().enumerate() {
            if a.trim().is_empty() {
                return Err(SimError::InvalidModel("empty outcome label".to_string()));
            }
            if labels[..i].contains(a) {
                return Err(SimError::InvalidModel(format!(
                    "duplicate outcome label `{a}`"
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The reference category (first label).
    pub fn reference(&self) -> &str {
        &self.labels[0]
    }

    /// Non-reference labels, in declared order.
    pub fn alternatives(&self) -> &[String] {
        &self.labels[1..]
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

impl TryFrom<Vec<String>> for OutcomeSet {
    type Error = SimError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        OutcomeSet::new(labels)
    }
}

impl From<OutcomeSet> for Vec<String> {
    fn from(value: OutcomeSet) -> Self {
        value.labels
    }
}

/// A case description: variable id → display-space scalar.
///
/// Constructed by the caller (UI, CLI, batch file); consumed, never mutated,
/// by the engines. Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseDescription {
    values: BTreeMap<String, f64>,
}

impl CaseDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a display-space value, replacing any previous value.
    pub fn set(&mut self, var: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(var.into(), value);
        self
    }

    pub fn get(&self, var: &str) -> Option<f64> {
        self.values.get(var).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge `other` into `self`, with `other` winning on conflicts.
    pub fn merge(&mut self, other: &CaseDescription) {
        for (k, v) in other.iter() {
            self.values.insert(k.to_string(), v);
        }
    }
}

impl FromIterator<(String, f64)> for CaseDescription {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Dot-cloud output: one probability vector per uncertainty draw.
///
/// Rows are in draw order. Order carries no meaning of its own but is
/// preserved so a fixed seed reproduces the ensemble bit-for-bit. Each row is
/// in `outcomes` order and sums to 1 within floating tolerance.
///
/// Ephemeral: recomputed on each simulate action, never persisted by the
/// engine (exports are the caller's choice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub outcomes: OutcomeSet,
    pub draws: Vec<Vec<f64>>,
}

impl SimulationResult {
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

/// One evaluated sweep grid point: display-space x plus the probability
/// vector (in `SweepResult::outcomes` order) at that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    pub x: f64,
    pub probabilities: Vec<f64>,
}

/// Ribbon output: point-estimate probability curves across one variable's
/// grid, all other covariates held at the baseline case. Rows are in grid
/// order. Ephemeral, like `SimulationResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    /// The swept variable's id.
    pub variable: String,
    pub outcomes: OutcomeSet,
    pub points: Vec<SweepPoint>,
}
