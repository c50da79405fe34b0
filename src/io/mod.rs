//! Input/output helpers.
//!
//! - model JSON read/write (`model_file`)
//! - case ingest: single JSON cases and batch CSV (`cases`)
//! - result exports (CSV/JSON) (`export`)

pub mod cases;
pub mod export;
pub mod model_file;

pub use cases::*;
pub use export::*;
pub use model_file::*;
