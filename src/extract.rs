//! Loads the raw `;`-delimited measurement file into memory.

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{PipelineError, Result};

pub const DELIMITER: u8 = b';';

/// The input file as read: a header record and every data row, all text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    /// Position of the column named `name`, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads the file at `path` into a [`RawTable`], preserving row order.
///
/// # Errors
///
/// Returns [`PipelineError::FileNotFound`] if the file cannot be opened and
/// [`PipelineError::Csv`] if its content is not well-formed delimited text.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn extract(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| PipelineError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let table = read_table(file).map_err(|source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Raw table loaded"
    );
    Ok(table)
}

/// Parses delimited text from any reader.
pub fn read_table<R: Read>(reader: R) -> csv::Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let rows = rdr.records().collect::<csv::Result<Vec<_>>>()?;

    Ok(RawTable { headers, rows })
}
