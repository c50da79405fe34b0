//! The fitted multinomial model and its prediction primitive.
//!
//! Fitting happens outside this crate; the engine consumes a finished fit
//! (point estimate + uncertainty representation) read-only. Prediction is a
//! small pure function so simulation/sweep code can stay generic.

pub mod coef;
pub mod fit;
pub mod predict;

pub use coef::*;
pub use fit::*;
pub use predict::*;
