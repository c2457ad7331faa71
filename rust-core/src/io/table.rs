//! Column tables of probe time series

use crate::error::TableError;
use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Named columns of a whitespace-delimited probe file
///
/// One row per snapshot, one column per variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTable {
    columns: Vec<String>,
    data: Array2<f64>,
}

impl ProbeTable {
    /// Parse table text
    ///
    /// The first non-blank line names the columns. It may start with `#`
    /// and names may be separated by whitespace or commas. Later lines
    /// starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header) = lines.next().ok_or(TableError::EmptyTable)?;
        let columns: Vec<String> = header
            .trim_start_matches('#')
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        if columns.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let mut values = Vec::new();
        let mut rows = 0;
        for (line_no, line) in lines {
            if line.starts_with('#') {
                continue;
            }
            let before = values.len();
            for token in line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| TableError::Parse {
                    line: line_no,
                    token: token.to_owned(),
                })?;
                values.push(value);
            }
            let found = values.len() - before;
            if found != columns.len() {
                return Err(TableError::RaggedRow {
                    line: line_no,
                    expected: columns.len(),
                    found,
                });
            }
            rows += 1;
        }

        log::trace!("Parsed probe table: {} rows x {} columns", rows, columns.len());
        let data = Array2::from_shape_vec((rows, columns.len()), values)?;
        Ok(Self { columns, data })
    }

    /// Read and parse a table file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        log::debug!("Loading probe table {}", path.display());
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    fn index_of(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_owned()))
    }

    /// View of a named column
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, TableError> {
        Ok(self.data.column(self.index_of(name)?))
    }

    /// Owned copy of a named column in row order
    pub fn column_vec(&self, name: &str) -> Result<Vec<f64>, TableError> {
        Ok(self.column(name)?.to_vec())
    }

    /// Rows whose `name` value lies in `[start, end]`
    pub fn time_window(&self, name: &str, start: f64, end: f64) -> Result<Self, TableError> {
        let keep: Vec<usize> = self
            .column(name)?
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t >= start && t <= end)
            .map(|(i, _)| i)
            .collect();
        Ok(self.select_rows(&keep))
    }

    /// Drop rows repeating an earlier `name` value, first occurrence kept
    ///
    /// Restarted solver runs write overlapping snapshots; the duplicated
    /// time stamps must go before the series is treated as monotonic.
    pub fn dedup_by(&self, name: &str) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        let keep: Vec<usize> = self
            .column(name)?
            .iter()
            .enumerate()
            // -0.0 and 0.0 are the same time
            .filter(|&(_, &t)| seen.insert((t + 0.0).to_bits()))
            .map(|(i, _)| i)
            .collect();
        if keep.len() < self.n_rows() {
            log::debug!("Dropped {} duplicate '{}' rows", self.n_rows() - keep.len(), name);
        }
        Ok(self.select_rows(&keep))
    }

    fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            data: self.data.select(Axis(0), rows),
        }
    }
}
