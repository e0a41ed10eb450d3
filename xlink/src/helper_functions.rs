use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{error, info};

use crate::models::{CanonicalPair, RESIDUE1, RESIDUE2};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// Fail with `ColumnNotFound` naming the first absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> PolarsResult<()> {
    for &name in columns {
        if df.column(name).is_err() {
            return Err(PolarsError::ColumnNotFound(
                format!("DataFrame must include a '{name}' column.").into(),
            ));
        }
    }
    Ok(())
}

/// Write `df` to `path` without an index column, propagating failures.
pub fn dataframe_to_csv(df: &mut DataFrame, path: &str) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
}

/// One-shot save; a failure is logged and swallowed so the run can continue.
pub fn save_dataframe_to_csv(df: &DataFrame, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let mut out = df.clone();
    match dataframe_to_csv(&mut out, &path.to_string_lossy()) {
        Ok(()) => {
            info!("DataFrame successfully saved to {}", path.display());
            true
        }
        Err(e) => {
            error!("An error occurred while saving the DataFrame to {}: {}", path.display(), e);
            false
        }
    }
}

/// Residue endpoints of every row as canonical pairs, in row order.
pub fn canonical_pairs(df: &DataFrame) -> PolarsResult<Vec<CanonicalPair>> {
    let r1 = residue_values(df, RESIDUE1)?;
    let r2 = residue_values(df, RESIDUE2)?;
    Ok(r1
        .into_iter()
        .zip(r2)
        .map(|(a, b)| CanonicalPair::new(a, b))
        .collect())
}

/// Integer residue positions of a column; fractional values are truncated.
pub fn residue_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<i64>> {
    require_columns(df, &[name])?;
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    casted
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PolarsError::ComputeError(format!("missing or non-integer '{name}' at row {row}").into())
            })
        })
        .collect()
}

/// Numeric column as `f64`, missing entries become NaN.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    require_columns(df, &[name])?;
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Integer column as `i64`, keeping missing entries as `None`.
pub fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    require_columns(df, &[name])?;
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().collect())
}

pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    require_columns(df, &[name])?;
    let casted = df.column(name)?.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn missing_column_is_reported_by_name() {
        let df = df!["Residue1" => &[1i64, 2]].unwrap();
        let err = require_columns(&df, &["Residue1", "Residue2"]).unwrap_err();
        assert!(matches!(err, PolarsError::ColumnNotFound(_)));
        assert!(err.to_string().contains("Residue2"));
    }

    #[test]
    fn residues_are_truncated_to_integers() {
        let df = df![
            "Residue1" => &[10.7f64, 20.0],
            "Residue2" => &[3.2f64, 40.9]
        ]
        .unwrap();
        assert_eq!(residue_values(&df, "Residue1").unwrap(), vec![10, 20]);
        assert_eq!(
            canonical_pairs(&df).unwrap(),
            vec![CanonicalPair(3, 10), CanonicalPair(20, 40)]
        );
    }

    #[test]
    fn integer_values_keep_missing_entries() {
        let df = df!["Spectral Count" => &[Some(12i64), None, Some(3)]].unwrap();
        assert_eq!(
            i64_values(&df, "Spectral Count").unwrap(),
            vec![Some(12), None, Some(3)]
        );
    }

    #[test]
    fn save_round_trips_and_failures_are_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = df![
            "Domain" => &["NTD", "insert 1"],
            "Total Residues" => &[1011u32, 91]
        ]
        .unwrap();

        assert!(save_dataframe_to_csv(&df, &path));
        let back = read_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(back.shape(), (2, 2));

        let unwritable = dir.path().join("no_such_dir").join("out.csv");
        assert!(!save_dataframe_to_csv(&df, &unwritable));
    }
}
