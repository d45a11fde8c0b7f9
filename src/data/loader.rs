//! CSV loading for the student dataset

use crate::data::{Dataset, FEATURE_COLUMNS, TARGET_COLUMN};
use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load the student dataset from a CSV file.
///
/// The file must carry the four feature columns and the target column;
/// row order is irrelevant and extra columns are ignored.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let file = File::open(path.as_ref())?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;

    dataset_from_frame(&df)
}

/// Extract the fixed feature/target columns from a DataFrame.
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset> {
    let n_rows = df.height();

    let feature_data: Vec<Vec<f64>> = FEATURE_COLUMNS
        .iter()
        .map(|&name| column_as_f64(df, name))
        .collect::<Result<_>>()?;

    let features =
        Array2::from_shape_fn((n_rows, FEATURE_COLUMNS.len()), |(r, c)| feature_data[c][r]);
    let targets = Array1::from_vec(column_as_f64(df, TARGET_COLUMN)?);

    Dataset::new(features, targets)
}

/// Pull a named column out as contiguous f64 values, casting if needed.
fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| GradecastError::ColumnNotFound(name.to_string()))?;

    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| GradecastError::Data(e.to_string()))?;

    let values: Vec<f64> = casted
        .f64()
        .map_err(|e| GradecastError::Data(e.to_string()))?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                GradecastError::Data(format!("column '{name}' contains a missing value"))
            })
        })
        .collect::<Result<_>>()?;

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_frame() -> DataFrame {
        df!(
            "Study_Hours" => &[2.0, 4.0, 6.0],
            "Attendance_Percentage" => &[55.0, 70.0, 90.0],
            "Internal_Marks" => &[20.0, 30.0, 42.0],
            "Assignment_Score" => &[10.0, 14.0, 19.0],
            "Final_Marks" => &[38.0, 55.0, 81.0],
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_from_frame() {
        let ds = dataset_from_frame(&student_frame()).unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_features(), 4);
        assert_eq!(ds.features()[[1, 1]], 70.0);
        assert_eq!(ds.targets()[2], 81.0);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("Study_Hours" => &[1.0, 2.0]).unwrap();
        let err = dataset_from_frame(&df).unwrap_err();
        assert!(matches!(err, GradecastError::ColumnNotFound(name) if name == "Attendance_Percentage"));
    }

    #[test]
    fn test_integer_columns_are_cast() {
        let df = df!(
            "Study_Hours" => &[2.0, 4.0],
            "Attendance_Percentage" => &[55.0, 70.0],
            "Internal_Marks" => &[20i64, 30],
            "Assignment_Score" => &[10i64, 14],
            "Final_Marks" => &[38.0, 55.0],
        )
        .unwrap();
        let ds = dataset_from_frame(&df).unwrap();
        assert_eq!(ds.features()[[0, 2]], 20.0);
    }

    #[test]
    fn test_load_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(
            &path,
            "Study_Hours,Attendance_Percentage,Internal_Marks,Assignment_Score,Final_Marks\n\
             5.0,75.0,30,15,60.0\n\
             8.0,92.0,44,19,85.5\n",
        )
        .unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.targets()[1], 85.5);
    }
}
