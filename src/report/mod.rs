//! Reporting utilities: ensemble summaries and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the sampling/prediction code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
