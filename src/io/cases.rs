//! Case ingestion: single JSON cases and batch CSV files.
//!
//! A single case file is a flat JSON object, variable id → display-space
//! value. A batch file is a CSV whose header names variable ids (plus an
//! optional leading `case_id` column); each data row is one case.
//!
//! Batch ingest is strict about the header and lenient about rows: a bad
//! row is recorded as a `RowError` and skipped, and the run only fails if no
//! valid row remains. This mirrors how the UI-facing path treats a single
//! bad case (hard error) versus how batch tooling wants to behave over a
//! large file.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::CaseDescription;
use crate::error::SimError;

/// A row-level error encountered during batch ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub case_id: Option<String>,
    pub message: String,
}

/// One ingested batch case.
#[derive(Debug, Clone)]
pub struct BatchCase {
    /// From the `case_id` column when present, otherwise `row-N`.
    pub id: String,
    pub case: CaseDescription,
}

/// Batch ingest output.
#[derive(Debug, Clone)]
pub struct BatchCases {
    pub cases: Vec<BatchCase>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Read a single case from a JSON object file.
pub fn read_case_json(path: &Path) -> Result<CaseDescription, SimError> {
    let file = File::open(path)
        .map_err(|e| SimError::io(format!("Failed to open case JSON '{}'", path.display()), e))?;
    serde_json::from_reader(file)
        .map_err(|e| SimError::json(format!("Invalid case JSON '{}'", path.display()), e))
}

/// Read a batch of cases from a CSV file.
pub fn read_cases_csv(path: &Path) -> Result<BatchCases, SimError> {
    let file = File::open(path)
        .map_err(|e| SimError::io(format!("Failed to open cases CSV '{}'", path.display()), e))?;
    read_cases_from(file, &path.display().to_string())
}

/// Batch ingest from any reader (the CSV file, or an in-memory buffer in
/// tests).
pub fn read_cases_from(reader: impl Read, source: &str) -> Result<BatchCases, SimError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| SimError::Csv {
            context: format!("Failed to read CSV headers from '{source}'"),
            source: e,
        })?
        .clone();

    let columns = parse_header(&headers)?;

    let mut cases = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in csv_reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    case_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns, idx) {
            Ok(case) => cases.push(case),
            Err((case_id, message)) => row_errors.push(RowError {
                line,
                case_id,
                message,
            }),
        }
    }

    if cases.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "No valid case rows in '{source}' ({} row error(s)).",
            row_errors.len()
        )));
    }

    Ok(BatchCases {
        cases,
        row_errors,
        rows_read,
    })
}

struct Columns {
    /// Index of the optional `case_id` column.
    case_id: Option<usize>,
    /// (column index, variable id) for every other column.
    variables: Vec<(usize, String)>,
}

fn parse_header(headers: &StringRecord) -> Result<Columns, SimError> {
    let mut case_id = None;
    let mut variables = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, raw) in headers.iter().enumerate() {
        // Strip a UTF-8 BOM on the first header; spreadsheet exports add one
        // and it would otherwise corrupt the first variable id.
        let name = raw.trim().trim_start_matches('\u{feff}').to_string();
        if name.is_empty() {
            return Err(SimError::InvalidArgument(format!(
                "Empty CSV header in column {}.",
                idx + 1
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(SimError::InvalidArgument(format!(
                "Duplicate CSV column `{name}`."
            )));
        }
        if name == "case_id" {
            case_id = Some(idx);
        } else {
            variables.push((idx, name));
        }
    }

    if variables.is_empty() {
        return Err(SimError::InvalidArgument(
            "Cases CSV has no variable columns.".to_string(),
        ));
    }

    Ok(Columns { case_id, variables })
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    row_idx: usize,
) -> Result<BatchCase, (Option<String>, String)> {
    let id = columns
        .case_id
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("row-{}", row_idx + 1));

    let mut case = CaseDescription::new();
    for (idx, var) in &columns.variables {
        let raw = record.get(*idx).map(str::trim).filter(|s| !s.is_empty());
        let Some(raw) = raw else {
            return Err((Some(id), format!("Missing value for `{var}`.")));
        };
        let value: f64 = raw
            .parse()
            .map_err(|_| (Some(id.clone()), format!("Invalid number `{raw}` for `{var}`.")))?;
        if !value.is_finite() {
            return Err((Some(id), format!("Non-finite value for `{var}`.")));
        }
        case.set(var.clone(), value);
    }

    Ok(BatchCase { id, case })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_csv_parses_valid_rows() {
        let csv = "case_id,log_age_eps_begin,housing_hardship\n\
                   infant,0.5,0\n\
                   teen,15,1\n";
        let batch = read_cases_from(csv.as_bytes(), "test").unwrap();

        assert_eq!(batch.rows_read, 2);
        assert_eq!(batch.cases.len(), 2);
        assert!(batch.row_errors.is_empty());
        assert_eq!(batch.cases[0].id, "infant");
        assert_eq!(batch.cases[1].case.get("log_age_eps_begin"), Some(15.0));
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "log_age_eps_begin,housing_hardship\n\
                   4.0,1\n\
                   not-a-number,1\n\
                   6.0,\n";
        let batch = read_cases_from(csv.as_bytes(), "test").unwrap();

        assert_eq!(batch.cases.len(), 1);
        assert_eq!(batch.row_errors.len(), 2);
        assert_eq!(batch.cases[0].id, "row-1");
        assert_eq!(batch.row_errors[0].line, 3);
    }

    #[test]
    fn fully_invalid_batch_is_an_error() {
        let csv = "log_age_eps_begin\nnope\n";
        let err = read_cases_from(csv.as_bytes(), "test").unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let csv = "age,age\n1,2\n";
        let err = read_cases_from(csv.as_bytes(), "test").unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(m) if m.contains("Duplicate")));
    }

    #[test]
    fn case_json_is_a_flat_object() {
        let case: CaseDescription =
            serde_json::from_str(r#"{"log_age_eps_begin": 4.0, "housing_hardship": 1.0}"#)
                .unwrap();
        assert_eq!(case.get("log_age_eps_begin"), Some(4.0));
        assert_eq!(case.len(), 2);
    }
}
