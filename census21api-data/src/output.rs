//! Persist tables as CSV.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use census21api_core::{Table, TableQuery};
use thiserror::Error;

/// Directory used by [`CsvDirectorySink`] when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Errors raised while persisting a table.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The output file could not be opened.
    #[error("failed to create {path}: {source}")]
    CreateFile {
        /// File that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Rows could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File being written.
        path: Utf8PathBuf,
        /// CSV writer failure.
        #[source]
        source: csv::Error,
    },
}

/// Destination for assembled tables.
pub trait TableSink {
    /// Persist `table`, the result of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the table cannot be stored.
    fn persist(&mut self, query: &TableQuery, table: &Table) -> Result<(), SinkError>;
}

impl<S: TableSink + ?Sized> TableSink for &mut S {
    fn persist(&mut self, query: &TableQuery, table: &Table) -> Result<(), SinkError> {
        (**self).persist(query, table)
    }
}

/// File name for the table of `query`:
/// `{population_type}_{dimensions joined by "_"}_{area_type}.csv`.
///
/// # Examples
/// ```
/// use census21api_core::TableQuery;
/// use census21api_data::csv_file_name;
///
/// let query = TableQuery::new("UR", "nat", ["sex", "resident_age_6a"])?;
/// assert_eq!(csv_file_name(&query), "UR_sex_resident_age_6a_nat.csv");
/// # Ok::<(), census21api_core::QueryError>(())
/// ```
#[must_use]
pub fn csv_file_name(query: &TableQuery) -> String {
    format!(
        "{}_{}_{}.csv",
        query.population_type(),
        query.dimensions().join("_"),
        query.area_type()
    )
}

/// Write `table` as CSV with a header row.
///
/// # Errors
///
/// Returns [`csv::Error`] when the writer fails.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(ToString::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes one CSV file per table into a directory, creating it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDirectorySink {
    dir: Utf8PathBuf,
}

impl CsvDirectorySink {
    /// Sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path the table of `query` is written to.
    #[must_use]
    pub fn path_for(&self, query: &TableQuery) -> Utf8PathBuf {
        self.dir.join(csv_file_name(query))
    }
}

impl Default for CsvDirectorySink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl TableSink for CsvDirectorySink {
    fn persist(&mut self, query: &TableQuery, table: &Table) -> Result<(), SinkError> {
        census21api_fs::ensure_dir(&self.dir).map_err(|source| SinkError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(query);
        let file = census21api_fs::create_utf8_file(&path).map_err(|source| {
            SinkError::CreateFile {
                path: path.clone(),
                source,
            }
        })?;
        write_csv(file, table).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("wrote {} rows to {path}", table.len());
        Ok(())
    }
}
