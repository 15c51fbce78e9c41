//! Raw tabular input.
//!
//! A [`RawTable`] is the untyped dataset handed over by whatever loaded the
//! spreadsheet: an ordered header row plus rows of optional string cells.
//! Headers are trimmed on construction so that every later lookup sees the
//! same text the column resolver matched against. Blank headers become
//! `Unnamed: {index}` and repeats get a `.N` suffix, so a table always has
//! unique headers.

use crate::error::{DataError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// An untyped table of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    #[serde(default)]
    repeated: BTreeSet<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from headers and rows.
    ///
    /// Headers are trimmed. Empty cells (after trimming) are stored as `None`.
    /// Blank and repeated headers are renamed; the first occurrence of a
    /// repeated header keeps its name.
    ///
    /// # Errors
    ///
    /// Returns an error if a row has a different width than the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        let (headers, repeated) = dedupe_headers(headers);

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| {
                if row.len() != headers.len() {
                    return Err(DataError::RaggedRow {
                        row: idx,
                        expected: headers.len(),
                        actual: row.len(),
                    });
                }
                Ok(row.into_iter().map(clean_cell).collect())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            headers,
            repeated,
            rows,
        })
    }

    /// Convenience constructor from string literals, mostly useful in tests.
    ///
    /// # Errors
    ///
    /// Same as [`RawTable::new`].
    pub fn from_strings(headers: &[&str], rows: &[Vec<&str>]) -> Result<Self> {
        Self::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Some((*c).to_string())).collect())
                .collect(),
        )
    }

    /// Read a CSV document with a header row.
    ///
    /// Short rows are padded with nulls and long rows are truncated, which is
    /// how spreadsheet exports with trailing empty cells usually look.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<Option<String>> =
                record.iter().take(width).map(|c| Some(c.to_string())).collect();
            row.resize(width, None);
            rows.push(row);
        }

        tracing::debug!(columns = width, rows = rows.len(), "read CSV table");
        Self::new(headers, rows)
    }

    /// Read a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Convert a polars DataFrame into a raw table.
    ///
    /// Every column is cast to its string representation; nulls stay `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be cast to strings.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let headers: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(headers.len()); df.height()];
        for column in df.get_columns() {
            let as_text = column.as_materialized_series().cast(&DataType::String)?;
            let values = as_text.str()?;
            for (row, value) in rows.iter_mut().zip(values.into_iter()) {
                row.push(value.map(str::to_string));
            }
        }

        Self::new(headers, rows)
    }

    /// Column headers, trimmed, in source order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether `header` appeared more than once in the source header row.
    ///
    /// Only the first occurrence is reachable under the original name.
    pub fn is_repeated(&self, header: &str) -> bool {
        self.repeated.contains(header.trim())
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, matched after trimming the query.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let header = header.trim();
        self.headers.iter().position(|h| h == header)
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| RowView { index, cells })
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    index: usize,
    cells: &'a [Option<String>],
}

impl<'a> RowView<'a> {
    /// Zero-based index of the row in the table.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Cell at a column position; `None` for nulls and out-of-range positions.
    pub fn cell(&self, column: usize) -> Option<&'a str> {
        self.cells.get(column).and_then(|c| c.as_deref())
    }
}

fn dedupe_headers(headers: Vec<String>) -> (Vec<String>, BTreeSet<String>) {
    let trimmed: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
    let originals: HashSet<&str> = trimmed.iter().map(String::as_str).collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut repeated = BTreeSet::new();
    let mut unique = Vec::with_capacity(trimmed.len());

    for (idx, header) in trimmed.iter().enumerate() {
        let name = if header.is_empty() {
            let mut candidate = format!("Unnamed: {idx}");
            let mut n = 1;
            while seen.contains(&candidate) || originals.contains(candidate.as_str()) {
                candidate = format!("Unnamed: {idx}.{n}");
                n += 1;
            }
            warn!(column = idx, renamed = %candidate, "blank column header");
            candidate
        } else if seen.contains(header) {
            repeated.insert(header.clone());
            let mut n = 1;
            let mut candidate = format!("{header}.{n}");
            while seen.contains(&candidate) || originals.contains(candidate.as_str()) {
                n += 1;
                candidate = format!("{header}.{n}");
            }
            warn!(column = idx, header = %header, renamed = %candidate, "repeated column header");
            candidate
        } else {
            header.clone()
        };
        seen.insert(name.clone());
        unique.push(name);
    }

    (unique, repeated)
}

fn clean_cell(cell: Option<String>) -> Option<String> {
    cell.and_then(|c| {
        let trimmed = c.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}
