//! Simulation engines.
//!
//! Responsibilities:
//!
//! - draw coefficient realizations from the fit's uncertainty representation
//! - dot cloud: per-draw outcome probabilities for a fixed case
//! - ribbon: point-estimate probability curves across one variable's grid
//!
//! Both engines are pure functions over explicit inputs (registry, model,
//! case) aside from the sampler's RNG stream; each call owns its generator,
//! so concurrent requests never share random state.

pub mod case;
pub mod grid;
pub mod sampler;
pub mod sweep;

pub use case::*;
pub use grid::*;
pub use sampler::*;
pub use sweep::*;
