//! Variable metadata: transforms, candidate roles, and the registry.
//!
//! Responsibilities:
//!
//! - named display↔model transform pairs with checked inverses
//! - per-variable UI metadata (roles, rounding, axis breakpoints)
//! - an immutable registry validated at construction

pub mod registry;
pub mod transform;

pub use registry::*;
pub use transform::*;
