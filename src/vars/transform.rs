//! Display↔model transform pairs.
//!
//! A fitted model often works on a transformed scale (e.g. log-age) while the
//! user thinks on the natural scale (age in years). Each variable carries one
//! transform pair:
//!
//! - `to_display(model_value)`: model space → display space
//! - `to_model(display_value)`: display space → model space
//!
//! The two must be mutually inverse over the variable's valid domain:
//! `to_model(to_display(x)) == x` within floating tolerance. The registry
//! probes this at construction, so a mismatched pair is rejected before any
//! simulation runs.
//!
//! Numerical notes:
//! - `Expm1` uses `exp_m1`/`ln_1p` to avoid cancellation near zero, the same
//!   reason the small-x paths exist elsewhere in this family of tools.
//! - Domain violations (log of a non-positive value, etc.) are reported as
//!   errors, never silently clamped.

/// Relative tolerance for the inverse-pair probe.
pub const ROUND_TRIP_TOL: f64 = 1e-9;

/// A named, data-driven transform pair.
///
/// The named kinds cover everything the configuration table needs; `Custom`
/// is the escape hatch for a pure function pair that can only be supplied in
/// code (it has no serialized form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// display = model
    Identity,
    /// display = -model
    Negate,
    /// display = exp(model), model = ln(display); display must be > 0
    Exp,
    /// display = exp(model) - 1, model = ln(1 + display); display must be > -1
    Expm1,
    /// display = scale * model + offset; scale must be non-zero
    Affine { scale: f64, offset: f64 },
    /// Pure function pair supplied in code.
    Custom {
        to_display: fn(f64) -> f64,
        to_model: fn(f64) -> f64,
    },
}

impl Transform {
    /// Model space → display space.
    ///
    /// Returns `Err` with a static reason when the result is undefined or
    /// non-finite at this input.
    pub fn to_display(&self, model_value: f64) -> Result<f64, &'static str> {
        if !model_value.is_finite() {
            return Err("non-finite model-space input");
        }
        let out = match self {
            Transform::Identity => model_value,
            Transform::Negate => -model_value,
            Transform::Exp => model_value.exp(),
            Transform::Expm1 => model_value.exp_m1(),
            Transform::Affine { scale, offset } => scale * model_value + offset,
            Transform::Custom { to_display, .. } => to_display(model_value),
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err("transform produced a non-finite display value")
        }
    }

    /// Display space → model space.
    pub fn to_model(&self, display_value: f64) -> Result<f64, &'static str> {
        if !display_value.is_finite() {
            return Err("non-finite display-space input");
        }
        let out = match self {
            Transform::Identity => display_value,
            Transform::Negate => -display_value,
            Transform::Exp => {
                if display_value <= 0.0 {
                    return Err("log of a non-positive value");
                }
                display_value.ln()
            }
            Transform::Expm1 => {
                if display_value <= -1.0 {
                    return Err("log1p of a value <= -1");
                }
                display_value.ln_1p()
            }
            Transform::Affine { scale, offset } => (display_value - offset) / scale,
            Transform::Custom { to_model, .. } => to_model(display_value),
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err("transform produced a non-finite model value")
        }
    }

    /// Construction-time parameter check (independent of any input value).
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Transform::Affine { scale, offset } => {
                if !(scale.is_finite() && offset.is_finite()) {
                    return Err("affine parameters must be finite");
                }
                if *scale == 0.0 {
                    return Err("affine scale must be non-zero");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Model-space probe values for the inverse-pair check.
    ///
    /// These cover sign changes and a few orders of magnitude; a `Custom`
    /// pair whose domain excludes some probe simply fails there (the check
    /// skips probes the forward map rejects).
    pub(crate) fn probe_values(&self) -> &'static [f64] {
        &[-3.0, -1.0, -0.25, 0.0, 0.25, 1.0, 3.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trips(t: Transform, model_value: f64) {
        let display = t.to_display(model_value).unwrap();
        let back = t.to_model(display).unwrap();
        assert!(
            (back - model_value).abs() <= ROUND_TRIP_TOL * model_value.abs().max(1.0),
            "{t:?}: {model_value} -> {display} -> {back}"
        );
    }

    #[test]
    fn named_kinds_round_trip() {
        let kinds = [
            Transform::Identity,
            Transform::Negate,
            Transform::Exp,
            Transform::Expm1,
            Transform::Affine {
                scale: 12.0,
                offset: -3.0,
            },
        ];
        for t in kinds {
            for &x in t.probe_values() {
                round_trips(t, x);
            }
        }
    }

    #[test]
    fn exp_rejects_non_positive_display_values() {
        let err = Transform::Exp.to_model(0.0).unwrap_err();
        assert_eq!(err, "log of a non-positive value");
        assert!(Transform::Exp.to_model(-4.0).is_err());
    }

    #[test]
    fn expm1_rejects_display_values_at_or_below_minus_one() {
        assert!(Transform::Expm1.to_model(-1.0).is_err());
        assert!(Transform::Expm1.to_model(-0.999).is_ok());
    }

    #[test]
    fn affine_zero_scale_is_invalid() {
        let t = Transform::Affine {
            scale: 0.0,
            offset: 1.0,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn expm1_is_accurate_near_zero() {
        // Plain exp(x) - 1 loses precision here; exp_m1 must not.
        let t = Transform::Expm1;
        let x = 1e-12;
        let display = t.to_display(x).unwrap();
        assert!((display - x).abs() < 1e-24);
    }

    #[test]
    fn custom_pair_round_trips() {
        fn sq(x: f64) -> f64 {
            x * x
        }
        fn sqrt(x: f64) -> f64 {
            x.sqrt()
        }
        let t = Transform::Custom {
            to_display: sq,
            to_model: sqrt,
        };
        // Only valid on non-negative model space.
        round_trips(t, 2.0);
        round_trips(t, 0.25);
    }
}
