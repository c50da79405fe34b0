//! The variable transform registry.
//!
//! The registry is the engine's view of the declarative per-variable
//! configuration: which variables exist, how their display and model
//! representations relate, and which UI roles (slider / facet / x-axis) each
//! may take. It is immutable after construction; all validation happens up
//! front so simulation code can assume a well-formed table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::vars::transform::{ROUND_TRIP_TOL, Transform};

/// Rounding granularity used when a slider candidate does not specify one.
pub const DEFAULT_ROUNDING: f64 = 0.1;

/// Custom x-axis breakpoints for a variable, in display space.
///
/// When labels are present there must be one per breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBreaks {
    pub breaks: Vec<f64>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Per-variable UI metadata and transform pair.
///
/// `id` matches a column in the modeling dataset (and therefore a predictor
/// name in the fitted model). The three role flags say where the UI may offer
/// this variable; the engine re-checks them defensively because it is also
/// called from tests and batch tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub id: String,
    pub display_name: String,
    pub definition: Option<String>,
    /// May be offered as a slider (continuous input control).
    pub slider: bool,
    /// May be offered as a facet (categorical panel split).
    pub facet: bool,
    /// May be offered as the x-axis of a sweep.
    pub axis: bool,
    /// Slider rounding granularity; `None` means [`DEFAULT_ROUNDING`].
    pub rounding: Option<f64>,
    pub transform: Transform,
    pub axis_breaks: Option<AxisBreaks>,
}

impl VariableSpec {
    /// A plain continuous variable with no UI roles and identity transform.
    pub fn plain(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            definition: None,
            slider: false,
            facet: false,
            axis: false,
            rounding: None,
            transform: Transform::Identity,
            axis_breaks: None,
        }
    }

    fn validate(&self) -> Result<(), SimError> {
        let fail = |reason: String| SimError::InvalidVariableSpec {
            var: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(fail("empty variable id".to_string()));
        }
        // Facet implies categorical: it cannot share a variable with the
        // continuous roles (slider/axis may combine with each other).
        if self.facet && (self.slider || self.axis) {
            return Err(fail(
                "facet candidates cannot also be slider or axis candidates".to_string(),
            ));
        }
        if let Some(g) = self.rounding {
            if !(g.is_finite() && g > 0.0) {
                return Err(fail(format!(
                    "rounding granularity must be a positive number, got {g}"
                )));
            }
        }
        if let Err(err) = self.transform.validate() {
            return Err(fail(err.to_string()));
        }
        if let Some(breaks) = &self.axis_breaks {
            if breaks.breaks.len() < 2 {
                return Err(fail("axis breakpoints need at least 2 entries".to_string()));
            }
            if breaks.breaks.iter().any(|b| !b.is_finite()) {
                return Err(fail("non-finite axis breakpoint".to_string()));
            }
            if let Some(labels) = &breaks.labels {
                if labels.len() != breaks.breaks.len() {
                    return Err(fail(format!(
                        "{} axis labels for {} breakpoints",
                        labels.len(),
                        breaks.breaks.len()
                    )));
                }
            }
        }

        self.probe_inverse_pair()
    }

    /// Probe `to_model(to_display(x)) == x` on a fixed model-space grid.
    ///
    /// Probes the forward map rejects are skipped (a transform's domain may
    /// legitimately exclude parts of the grid); at least one probe must
    /// survive, otherwise the pair is unusable.
    fn probe_inverse_pair(&self) -> Result<(), SimError> {
        let mut checked = 0usize;
        for &x in self.transform.probe_values() {
            let Ok(display) = self.transform.to_display(x) else {
                continue;
            };
            let back = self.transform.to_model(display).map_err(|reason| {
                SimError::InvalidVariableSpec {
                    var: self.id.clone(),
                    reason: format!("inverse rejects forward output at model value {x}: {reason}"),
                }
            })?;
            if (back - x).abs() > ROUND_TRIP_TOL * x.abs().max(1.0) {
                return Err(SimError::InvalidVariableSpec {
                    var: self.id.clone(),
                    reason: format!(
                        "transform pair is not mutually inverse at model value {x} \
                         (round-trip gave {back})"
                    ),
                });
            }
            checked += 1;
        }
        if checked == 0 {
            return Err(SimError::InvalidVariableSpec {
                var: self.id.clone(),
                reason: "transform rejected every probe value".to_string(),
            });
        }
        Ok(())
    }
}

/// Immutable lookup table of [`VariableSpec`]s.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    vars: BTreeMap<String, VariableSpec>,
}

impl VariableRegistry {
    /// Validate every spec and build the registry.
    ///
    /// Rejects duplicate ids, invalid role combinations, non-positive
    /// rounding granularities, and transform pairs that fail the inverse
    /// probe.
    pub fn new(specs: impl IntoIterator<Item = VariableSpec>) -> Result<Self, SimError> {
        let mut vars = BTreeMap::new();
        for spec in specs {
            spec.validate()?;
            let id = spec.id.clone();
            if vars.insert(id.clone(), spec).is_some() {
                return Err(SimError::InvalidVariableSpec {
                    var: id,
                    reason: "duplicate variable id".to_string(),
                });
            }
        }
        Ok(Self { vars })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, var_id: &str) -> Result<&VariableSpec, SimError> {
        self.vars
            .get(var_id)
            .ok_or_else(|| SimError::UnknownVariable(var_id.to_string()))
    }

    pub fn contains(&self, var_id: &str) -> bool {
        self.vars.contains_key(var_id)
    }

    /// Registered specs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableSpec> {
        self.vars.values()
    }

    /// Model space → display space for one variable.
    pub fn to_display(&self, var_id: &str, model_value: f64) -> Result<f64, SimError> {
        let spec = self.get(var_id)?;
        spec.transform
            .to_display(model_value)
            .map_err(|reason| SimError::Domain {
                var: var_id.to_string(),
                value: model_value,
                reason,
            })
    }

    /// Display space → model space for one variable.
    pub fn to_model(&self, var_id: &str, display_value: f64) -> Result<f64, SimError> {
        let spec = self.get(var_id)?;
        spec.transform
            .to_model(display_value)
            .map_err(|reason| SimError::Domain {
                var: var_id.to_string(),
                value: display_value,
                reason,
            })
    }

    /// Slider rounding granularity, falling back to [`DEFAULT_ROUNDING`].
    pub fn rounding(&self, var_id: &str) -> Result<f64, SimError> {
        Ok(self.get(var_id)?.rounding.unwrap_or(DEFAULT_ROUNDING))
    }

    pub fn is_slider_candidate(&self, var_id: &str) -> Result<bool, SimError> {
        Ok(self.get(var_id)?.slider)
    }

    pub fn is_facet_candidate(&self, var_id: &str) -> Result<bool, SimError> {
        Ok(self.get(var_id)?.facet)
    }

    pub fn is_axis_candidate(&self, var_id: &str) -> Result<bool, SimError> {
        Ok(self.get(var_id)?.axis)
    }

    pub fn axis_breaks(&self, var_id: &str) -> Result<Option<&AxisBreaks>, SimError> {
        Ok(self.get(var_id)?.axis_breaks.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn age_spec() -> VariableSpec {
        VariableSpec {
            id: "log_age_eps_begin".to_string(),
            display_name: "Age at episode begin".to_string(),
            definition: Some("Child's age in years when the episode began.".to_string()),
            slider: true,
            facet: false,
            axis: true,
            rounding: Some(0.5),
            transform: Transform::Exp,
            axis_breaks: None,
        }
    }

    #[test]
    fn lookup_of_unregistered_variable_fails() {
        let reg = VariableRegistry::new([age_spec()]).unwrap();
        let err = reg.to_model("no_such_var", 1.0).unwrap_err();
        assert!(matches!(err, SimError::UnknownVariable(v) if v == "no_such_var"));
    }

    #[test]
    fn registered_transforms_round_trip() {
        let reg = VariableRegistry::new([age_spec()]).unwrap();
        for x in [-2.0, -0.5, 0.0, 1.0, 2.5] {
            let display = reg.to_display("log_age_eps_begin", x).unwrap();
            let back = reg.to_model("log_age_eps_begin", display).unwrap();
            assert!((back - x).abs() < 1e-9);
        }
    }

    #[test]
    fn domain_violation_is_reported_not_clamped() {
        let reg = VariableRegistry::new([age_spec()]).unwrap();
        let err = reg.to_model("log_age_eps_begin", -3.0).unwrap_err();
        assert!(matches!(err, SimError::Domain { .. }));
    }

    #[test]
    fn facet_role_excludes_continuous_roles() {
        let mut spec = VariableSpec::plain("placement_type", "Placement type");
        spec.facet = true;
        spec.axis = true;
        let err = VariableRegistry::new([spec]).unwrap_err();
        assert!(matches!(err, SimError::InvalidVariableSpec { .. }));
    }

    #[test]
    fn rounding_defaults_when_unspecified() {
        let mut spec = VariableSpec::plain("visits", "Visits per month");
        spec.slider = true;
        let reg = VariableRegistry::new([spec]).unwrap();
        assert_eq!(reg.rounding("visits").unwrap(), DEFAULT_ROUNDING);

        let reg = VariableRegistry::new([age_spec()]).unwrap();
        assert_eq!(reg.rounding("log_age_eps_begin").unwrap(), 0.5);
    }

    #[test]
    fn mismatched_transform_pair_is_rejected_at_construction() {
        fn forward(x: f64) -> f64 {
            x + 1.0
        }
        fn not_inverse(x: f64) -> f64 {
            x + 1.0
        }
        let mut spec = VariableSpec::plain("broken", "Broken");
        spec.transform = Transform::Custom {
            to_display: forward,
            to_model: not_inverse,
        };
        let err = VariableRegistry::new([spec]).unwrap_err();
        assert!(matches!(err, SimError::InvalidVariableSpec { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = VariableRegistry::new([age_spec(), age_spec()]).unwrap_err();
        assert!(matches!(err, SimError::InvalidVariableSpec { .. }));
    }

    #[test]
    fn axis_break_labels_must_match_breaks() {
        let mut spec = age_spec();
        spec.axis_breaks = Some(AxisBreaks {
            breaks: vec![0.0, 5.0, 10.0, 15.0],
            labels: Some(vec!["0".to_string(), "5".to_string()]),
        });
        assert!(VariableRegistry::new([spec]).is_err());
    }
}
