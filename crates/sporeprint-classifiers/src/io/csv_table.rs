//! Comma-separated dataset reader.
use std::collections::HashSet;
use std::path::Path;

use csv::StringRecord;

use crate::error::{ClassifierError, Result};

/// A table of raw string cells, exactly as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        find_column(&self.headers, name)
    }

    /// Iterate over the cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[idx].as_str())
    }
}

/// Read a headed CSV file into a `RawTable`.
///
/// Every row must have as many cells as the header. Header names are trimmed,
/// cells are kept verbatim.
pub fn read_csv_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let display = path.as_ref().display().to_string();
    let reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(&path)
        .map_err(|source| ClassifierError::Read {
            path: display.clone(),
            source,
        })?;
    read_records(reader, &display)
}

/// Read a headed CSV table from any reader (used for in-memory fixtures).
pub fn read_csv_from_reader<R: std::io::Read>(rdr: R) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(rdr);
    read_records(reader, "<reader>")
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>, display: &str) -> Result<RawTable> {
    let headers = reader
        .headers()
        .map_err(|source| ClassifierError::Read {
            path: display.to_string(),
            source,
        })?
        .clone();
    let headers = validate_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| ClassifierError::Read {
            path: display.to_string(),
            source,
        })?;
        if record.len() != headers.len() {
            return Err(ClassifierError::MalformedData(format!(
                "row {} has {} fields, expected {}",
                row_idx + 1,
                record.len(),
                headers.len()
            )));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(ClassifierError::MalformedData(format!(
            "{} contains a header but no data rows",
            display
        )));
    }

    log::debug!("Read {} rows x {} columns from {}", rows.len(), headers.len(), display);
    Ok(RawTable { headers, rows })
}

fn validate_headers(headers: &StringRecord) -> Result<Vec<String>> {
    if headers.is_empty() {
        return Err(ClassifierError::MalformedData("missing header row".to_string()));
    }
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(ClassifierError::MalformedData(format!(
                "header {} is empty",
                idx + 1
            )));
        }
        if !seen.insert(header.to_ascii_lowercase()) {
            return Err(ClassifierError::MalformedData(format!(
                "duplicate column '{}'",
                header
            )));
        }
        names.push(header.to_string());
    }
    Ok(names)
}

pub(crate) fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}
