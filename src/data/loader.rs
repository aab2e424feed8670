//! CSV Data Loader Module
//! Handles loading the raw listings file into a DataFrame using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars.
///
/// A failed load leaves the loader empty; the caller decides whether the
/// pipeline proceeds.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a CSV file using Polars.
    ///
    /// Logs one line per outcome: row count on success, the error text on
    /// failure.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        self.file_path = Some(file_path.to_path_buf());

        // Use lazy evaluation for memory efficiency, then collect
        let result = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect());

        match result {
            Ok(df) => {
                info!(rows = df.height(), path = %file_path.display(), "dataset loaded");
                self.df = Some(df);
                self.df.as_ref().ok_or(LoaderError::NoData)
            }
            Err(err) => {
                error!(path = %file_path.display(), "failed to load dataset: {err}");
                self.df = None;
                Err(err.into())
            }
        }
    }

    /// Get list of column names from the loaded DataFrame.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path of the last load attempt.
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_valid_csv_reports_rows() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "Price,Ram,SSD,Rating,Model").unwrap();
        writeln!(tmp, "\"₹54,999\",8 GB,512 GB,4.5,HP Pavilion 15").unwrap();
        writeln!(tmp, "\"₹34,999\",16 GB,256 GB,4.1,Dell Inspiron").unwrap();
        tmp.flush().unwrap();

        let mut loader = DataLoader::new();
        let df = loader.load_csv(tmp.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(loader.row_count(), 2);
        assert!(loader.columns().contains(&"Model".to_string()));
    }

    #[test]
    fn load_missing_file_returns_error_without_panicking() {
        let mut loader = DataLoader::new();
        let result = loader.load_csv(Path::new("does/not/exist.csv"));
        assert!(result.is_err());
        assert!(loader.dataframe().is_none());
        assert_eq!(loader.row_count(), 0);
    }
}
