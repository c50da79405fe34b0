//! Shared run logic behind the CLI subcommands.
//!
//! Keeping this in one place keeps `cli` purely about flags and `sim` purely
//! about math:
//! load model -> assemble case(s) -> simulate/sweep -> report -> export
//!
//! A future front-end (service, notebook bindings) can call these directly.

use std::path::Path;

use log::{debug, info};

use crate::cli::{BatchArgs, CaseArgs, SimulateArgs, SweepArgs};
use crate::domain::CaseDescription;
use crate::error::SimError;
use crate::io;
use crate::model::FittedModel;
use crate::report::{self, CaseSummary};
use crate::sim;
use crate::vars::VariableRegistry;

/// Run `osim simulate`.
pub fn run_simulate(args: &SimulateArgs) -> Result<(), SimError> {
    let (registry, model) = load_model(&args.model.model)?;
    let case = assemble_case(&args.case)?;

    info!(
        "simulating {} draws over {} predictors",
        args.draws,
        model.predictors().len()
    );
    let result = sim::simulate(&case, &registry, &model, args.draws, args.seed)?;

    println!(
        "{}",
        report::format_simulation_summary(&case, &result, &registry)
    );

    if let Some(path) = &args.export {
        io::write_cloud_csv(path, &result)?;
        println!("Wrote dot cloud CSV: {}", path.display());
    }
    if let Some(path) = &args.export_json {
        io::write_json(path, &result)?;
        println!("Wrote result JSON: {}", path.display());
    }

    Ok(())
}

/// Run `osim sweep`.
pub fn run_sweep(args: &SweepArgs) -> Result<(), SimError> {
    let (registry, model) = load_model(&args.model.model)?;
    let baseline = assemble_case(&args.case)?;
    let grid = resolve_grid(args, &registry)?;

    info!(
        "sweeping `{}` over {} grid points",
        args.variable,
        grid.len()
    );
    let result = sim::sweep(&baseline, &args.variable, &grid, &registry, &model)?;

    println!("{}", report::format_sweep_table(&result, &registry));

    if let Some(path) = &args.export {
        io::write_sweep_csv(path, &result)?;
        println!("Wrote ribbon CSV: {}", path.display());
    }
    if let Some(path) = &args.export_json {
        io::write_json(path, &result)?;
        println!("Wrote result JSON: {}", path.display());
    }

    Ok(())
}

/// Run `osim batch`.
pub fn run_batch(args: &BatchArgs) -> Result<(), SimError> {
    let (registry, model) = load_model(&args.model.model)?;
    let batch = io::read_cases_csv(&args.cases)?;

    info!(
        "batch: {} case(s), {} row error(s)",
        batch.cases.len(),
        batch.row_errors.len()
    );
    for err in &batch.row_errors {
        eprintln!(
            "warning: line {}{}: {}",
            err.line,
            err.case_id
                .as_deref()
                .map(|id| format!(" ({id})"))
                .unwrap_or_default(),
            err.message
        );
    }

    let mut summaries = Vec::with_capacity(batch.cases.len());
    for (i, batch_case) in batch.cases.iter().enumerate() {
        // Offset the base seed per case: every row is reproducible under a
        // fixed --seed but rows stay mutually independent.
        let seed = args.seed.map(|s| s + i as u64);
        let result = sim::simulate(&batch_case.case, &registry, &model, args.draws, seed)?;
        summaries.push(CaseSummary {
            case_id: batch_case.id.clone(),
            outcomes: report::summarize(&result),
        });
    }

    println!("{}", report::format_batch_summaries(&summaries));

    if let Some(path) = &args.export {
        io::write_batch_csv(path, &summaries)?;
        println!("Wrote batch summary CSV: {}", path.display());
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<(VariableRegistry, FittedModel), SimError> {
    let (registry, model) = io::read_model_json(path)?;
    debug!(
        "loaded model: {} outcomes, {} predictors, {} variables",
        model.outcomes().len(),
        model.predictors().len(),
        registry.len()
    );
    Ok((registry, model))
}

/// Build the case from `--case` (optional file) plus `--set` overrides.
fn assemble_case(args: &CaseArgs) -> Result<CaseDescription, SimError> {
    let mut case = match &args.case {
        Some(path) => io::read_case_json(path)?,
        None => CaseDescription::new(),
    };
    for set in &args.sets {
        let (var, value) = parse_set(set)?;
        case.set(var, value);
    }
    Ok(case)
}

/// Parse one `--set var=value` argument.
fn parse_set(raw: &str) -> Result<(String, f64), SimError> {
    let Some((var, value)) = raw.split_once('=') else {
        return Err(SimError::InvalidArgument(format!(
            "Invalid --set '{raw}': expected VAR=VALUE."
        )));
    };
    let var = var.trim();
    if var.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "Invalid --set '{raw}': empty variable id."
        )));
    }
    let value: f64 = value.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!("Invalid --set '{raw}': value is not a number."))
    })?;
    Ok((var.to_string(), value))
}

/// Resolve the sweep grid: explicit `--grid`, then `--range`, then the
/// variable's configured axis breakpoints.
fn resolve_grid(args: &SweepArgs, registry: &VariableRegistry) -> Result<Vec<f64>, SimError> {
    if let Some(raw) = &args.grid {
        return parse_grid_list(raw);
    }
    if let Some(raw) = &args.range {
        return parse_range(raw);
    }
    if let Some(breaks) = registry.axis_breaks(&args.variable)? {
        return Ok(breaks.breaks.clone());
    }
    Err(SimError::InvalidArgument(format!(
        "No grid for `{}`: pass --grid or --range (the variable has no configured breakpoints).",
        args.variable
    )))
}

fn parse_grid_list(raw: &str) -> Result<Vec<f64>, SimError> {
    let values: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect();
    values.map_err(|_| {
        SimError::InvalidArgument(format!(
            "Invalid --grid '{raw}': expected comma-separated numbers."
        ))
    })
}

fn parse_range(raw: &str) -> Result<Vec<f64>, SimError> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [min, max, steps] = parts.as_slice() else {
        return Err(SimError::InvalidArgument(format!(
            "Invalid --range '{raw}': expected MIN:MAX:STEPS."
        )));
    };
    let min: f64 = min.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!("Invalid --range '{raw}': MIN is not a number."))
    })?;
    let max: f64 = max.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!("Invalid --range '{raw}': MAX is not a number."))
    })?;
    let steps: usize = steps.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!("Invalid --range '{raw}': STEPS is not an integer."))
    })?;
    sim::linear_space(min, max, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_accepts_var_equals_value() {
        assert_eq!(parse_set("age=4.5").unwrap(), ("age".to_string(), 4.5));
        assert_eq!(
            parse_set(" visits = 2 ").unwrap(),
            ("visits".to_string(), 2.0)
        );
        assert!(parse_set("age").is_err());
        assert!(parse_set("=4").is_err());
        assert!(parse_set("age=four").is_err());
    }

    #[test]
    fn parse_grid_list_preserves_order() {
        assert_eq!(parse_grid_list("3, 1, 2").unwrap(), vec![3.0, 1.0, 2.0]);
        assert!(parse_grid_list("1,two,3").is_err());
    }

    #[test]
    fn parse_range_builds_an_even_grid() {
        let grid = parse_range("0:10:5").unwrap();
        assert_eq!(grid, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert!(parse_range("0:10").is_err());
        assert!(parse_range("10:0:5").is_err());
    }
}
