//! Export simulation and sweep results to CSV/JSON.
//!
//! CSV exports are meant to be easy to consume in spreadsheets or downstream
//! plotting scripts: one row per draw (dot cloud) or per grid point (ribbon),
//! one column per outcome, in declared outcome order. JSON exports mirror
//! the result structs verbatim.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{SimulationResult, SweepResult};
use crate::error::SimError;
use crate::report::CaseSummary;

/// Write the dot cloud: `draw,<outcome...>` with one row per draw.
pub fn write_cloud_csv(path: &Path, result: &SimulationResult) -> Result<(), SimError> {
    let mut file = create(path)?;

    let header = std::iter::once("draw".to_string())
        .chain(result.outcomes.labels().iter().cloned())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(file, "{header}").map_err(|e| write_err(path, e))?;

    for (i, row) in result.draws.iter().enumerate() {
        let probs = row
            .iter()
            .map(|p| format!("{p:.10}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{},{probs}", i + 1).map_err(|e| write_err(path, e))?;
    }
    Ok(())
}

/// Write the ribbon: `<variable>,<outcome...>` with one row per grid point.
pub fn write_sweep_csv(path: &Path, result: &SweepResult) -> Result<(), SimError> {
    let mut file = create(path)?;

    let header = std::iter::once(result.variable.clone())
        .chain(result.outcomes.labels().iter().cloned())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(file, "{header}").map_err(|e| write_err(path, e))?;

    for point in &result.points {
        let probs = point
            .probabilities
            .iter()
            .map(|p| format!("{p:.10}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{:.10},{probs}", point.x).map_err(|e| write_err(path, e))?;
    }
    Ok(())
}

/// Write per-case batch summaries: one row per case, mean probability per
/// outcome.
pub fn write_batch_csv(path: &Path, summaries: &[CaseSummary]) -> Result<(), SimError> {
    let Some(first) = summaries.first() else {
        return Err(SimError::InvalidArgument(
            "Nothing to export: no batch summaries.".to_string(),
        ));
    };
    let mut file = create(path)?;

    let header = std::iter::once("case_id".to_string())
        .chain(
            first
                .outcomes
                .iter()
                .map(|o| format!("mean_{}", o.outcome)),
        )
        .collect::<Vec<_>>()
        .join(",");
    writeln!(file, "{header}").map_err(|e| write_err(path, e))?;

    for summary in summaries {
        let means = summary
            .outcomes
            .iter()
            .map(|o| format!("{:.10}", o.mean))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{},{means}", summary.case_id).map_err(|e| write_err(path, e))?;
    }
    Ok(())
}

/// Write any result as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SimError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| SimError::json(format!("Failed to write JSON '{}'", path.display()), e))
}

fn create(path: &Path) -> Result<File, SimError> {
    File::create(path)
        .map_err(|e| SimError::io(format!("Failed to create export '{}'", path.display()), e))
}

fn write_err(path: &Path, e: std::io::Error) -> SimError {
    SimError::io(format!("Failed to write export '{}'", path.display()), e)
}
