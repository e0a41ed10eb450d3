use polars::prelude::*;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub mean: f64,
    /// Sample standard deviation (ddof = 1).
    pub stdev: f64,
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)
}

/// Mean and sample standard deviation of `column_name`.
///
/// Returns `None` (after logging) when the column is absent or not numeric.
pub fn calculate_average_and_stdev_of_column(
    df: &DataFrame,
    column_name: &str,
) -> Option<ColumnSummary> {
    let column = match df.column(column_name) {
        Ok(column) => column,
        Err(_) => {
            error!("The column '{}' does not exist in the DataFrame.", column_name);
            return None;
        }
    };

    if !is_numeric(column.dtype()) {
        error!("The column '{}' contains non-numeric data.", column_name);
        return None;
    }

    let values = match column.cast(&DataType::Float64) {
        Ok(values) => values,
        Err(e) => {
            error!("The column '{}' could not be aggregated: {}", column_name, e);
            return None;
        }
    };
    let values = values.f64().ok()?;

    Some(ColumnSummary {
        mean: values.mean().unwrap_or(f64::NAN),
        stdev: values.std(1).unwrap_or(f64::NAN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn mean_and_sample_stdev() {
        let df = df!["CA Distance" => &[10.0, 20.0, 30.0]].unwrap();
        let summary = calculate_average_and_stdev_of_column(&df, "CA Distance").unwrap();
        assert!((summary.mean - 20.0).abs() < 1e-12);
        assert!((summary.stdev - 10.0).abs() < 1e-12);
    }

    #[test]
    fn integer_columns_are_aggregated() {
        let df = df!["Spectral Count" => &[1i64, 2, 3, 4]].unwrap();
        let summary = calculate_average_and_stdev_of_column(&df, "Spectral Count").unwrap();
        assert!((summary.mean - 2.5).abs() < 1e-12);
    }

    #[test]
    fn narrow_integer_columns_are_aggregated() {
        let df = df!["Spectral Count" => &[1i16, 2, 3]].unwrap();
        let summary = calculate_average_and_stdev_of_column(&df, "Spectral Count").unwrap();
        assert!((summary.mean - 2.0).abs() < 1e-12);
        assert!((summary.stdev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn absent_column_returns_none() {
        let df = df!["CA Distance" => &[10.0]].unwrap();
        assert!(calculate_average_and_stdev_of_column(&df, "Missing").is_none());
    }

    #[test]
    fn text_column_returns_none() {
        let df = df!["Domain Association" => &["NTD to NTD"]].unwrap();
        assert!(calculate_average_and_stdev_of_column(&df, "Domain Association").is_none());
    }
}
