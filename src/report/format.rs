//! Ensemble summaries and terminal tables.

use crate::domain::{CaseDescription, SimulationResult, SweepResult};
use crate::vars::VariableRegistry;

/// Per-outcome summary of a simulated ensemble.
#[derive(Debug, Clone)]
pub struct OutcomeSummary {
    pub outcome: String,
    pub mean: f64,
    pub sd: f64,
    /// 2.5% quantile of the draw distribution.
    pub lo: f64,
    pub median: f64,
    /// 97.5% quantile of the draw distribution.
    pub hi: f64,
}

/// One batch case's summary (used by `osim batch` and its CSV export).
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub case_id: String,
    pub outcomes: Vec<OutcomeSummary>,
}

/// Summarize the ensemble per outcome: mean, sd, and 2.5/50/97.5 quantiles.
pub fn summarize(result: &SimulationResult) -> Vec<OutcomeSummary> {
    let n = result.draws.len();
    result
        .outcomes
        .labels()
        .iter()
        .enumerate()
        .map(|(k, label)| {
            let mut values: Vec<f64> = result.draws.iter().map(|row| row[k]).collect();

            let mean = values.iter().sum::<f64>() / n as f64;
            let var = values
                .iter()
                .map(|v| (v - mean) * (v - mean))
                .sum::<f64>()
                / n as f64;

            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            OutcomeSummary {
                outcome: label.clone(),
                mean,
                sd: var.sqrt(),
                lo: quantile_sorted(&values, 0.025),
                median: quantile_sorted(&values, 0.5),
                hi: quantile_sorted(&values, 0.975),
            }
        })
        .collect()
}

/// Quantile of a sorted sample (linear interpolation between order
/// statistics).
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Format the dot-cloud summary for the terminal.
pub fn format_simulation_summary(
    case: &CaseDescription,
    result: &SimulationResult,
    registry: &VariableRegistry,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== osim - outcome simulation ({} draws) ===\n",
        result.draw_count()
    ));

    out.push_str("Case:\n");
    for (var, value) in case.iter() {
        let name = registry
            .get(var)
            .map(|spec| spec.display_name.clone())
            .unwrap_or_else(|_| var.to_string());
        out.push_str(&format!("  {name}: {value}\n"));
    }
    out.push('\n');

    out.push_str(&format!(
        "{:<16} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
        "outcome", "mean", "sd", "2.5%", "median", "97.5%"
    ));
    out.push_str(&format!(
        "{:-<16} {:-<8} {:-<8} {:-<8} {:-<8} {:-<8}\n",
        "", "", "", "", "", ""
    ));
    for s in summarize(result) {
        out.push_str(&format!(
            "{:<16} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}\n",
            truncate(&s.outcome, 16),
            s.mean,
            s.sd,
            s.lo,
            s.median,
            s.hi
        ));
    }

    out
}

/// Format the ribbon table for the terminal: one row per grid point.
pub fn format_sweep_table(result: &SweepResult, registry: &VariableRegistry) -> String {
    let mut out = String::new();

    let axis_name = registry
        .get(&result.variable)
        .map(|spec| spec.display_name.clone())
        .unwrap_or_else(|_| result.variable.clone());
    out.push_str(&format!("=== osim - sweep over {axis_name} ===\n"));

    out.push_str(&format!("{:>12}", truncate(&result.variable, 12)));
    for label in result.outcomes.labels() {
        out.push_str(&format!(" {:>14}", truncate(label, 14)));
    }
    out.push('\n');

    for point in &result.points {
        out.push_str(&format!("{:>12.4}", point.x));
        for p in &point.probabilities {
            out.push_str(&format!(" {:>14.4}", p));
        }
        out.push('\n');
    }

    out
}

/// Format batch summaries: one row per case, mean probability per outcome.
pub fn format_batch_summaries(summaries: &[CaseSummary]) -> String {
    let mut out = String::new();

    let Some(first) = summaries.first() else {
        return out;
    };

    out.push_str(&format!("{:<20}", "case_id"));
    for o in &first.outcomes {
        out.push_str(&format!(" {:>14}", truncate(&o.outcome, 14)));
    }
    out.push('\n');

    for summary in summaries {
        out.push_str(&format!("{:<20}", truncate(&summary.case_id, 20)));
        for o in &summary.outcomes {
            out.push_str(&format!(" {:>14.4}", o.mean));
        }
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OutcomeSet;

    fn result() -> SimulationResult {
        SimulationResult {
            outcomes: OutcomeSet::new(["A", "B"]).unwrap(),
            draws: vec![
                vec![0.2, 0.8],
                vec![0.4, 0.6],
                vec![0.6, 0.4],
                vec![0.8, 0.2],
            ],
        }
    }

    #[test]
    fn summarize_covers_every_outcome() {
        let summaries = summarize(&result());
        assert_eq!(summaries.len(), 2);
        assert!((summaries[0].mean - 0.5).abs() < 1e-12);
        assert!((summaries[0].median - 0.5).abs() < 1e-12);
        assert!((summaries[1].mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quantiles_interpolate_between_order_statistics() {
        let sorted = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 0.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 3.0);
        assert!((quantile_sorted(&sorted, 0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn sd_is_zero_for_a_constant_ensemble() {
        let constant = SimulationResult {
            outcomes: OutcomeSet::new(["A", "B"]).unwrap(),
            draws: vec![vec![0.3, 0.7]; 5],
        };
        let summaries = summarize(&constant);
        assert_eq!(summaries[0].sd, 0.0);
        assert_eq!(summaries[0].lo, 0.3);
        assert_eq!(summaries[0].hi, 0.3);
    }
}
