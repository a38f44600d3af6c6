//! Immutable tabular data
//!
//! A [`Dataset`] is loaded once from CSV and only ever read afterwards.
//! Cells are typed per value: anything that parses as a finite number is a
//! number, blanks are empty, everything else is text.

use serde::Serialize;
use serde_json::Value;
use std::io::Read;

use super::error::{DatasetError, DatasetResult};
use super::view::DatasetView;

/// Largest integer an f64 represents exactly
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Convert a float to JSON, keeping integral values as integers
pub fn number_value(x: f64) -> Value {
    if x.is_finite() && x.fract() == 0.0 && x.abs() <= MAX_EXACT_INT {
        Value::from(x as i64)
    } else {
        serde_json::Number::from_f64(x)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Infer a cell from raw CSV text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// JSON form used in figures and widget props
    pub fn to_value(&self) -> Value {
        match self {
            Cell::Number(n) => number_value(*n),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Empty => Value::Null,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(_) => write!(f, "{}", self.to_value()),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

/// Read-only table of named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Build a dataset from already-typed rows
    ///
    /// Rows are padded with empty cells (or truncated) to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> DatasetResult<Self> {
        if columns.is_empty() {
            return Err(DatasetError::Empty("header row is missing".to_string()));
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Parse CSV with a header row from any reader
    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect());
        }

        Self::new(columns, rows)
    }

    /// Parse CSV text
    pub fn from_csv_str(csv_data: &str) -> DatasetResult<Self> {
        Self::from_reader(csv_data.as_bytes())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn row(&self, idx: usize) -> &[Cell] {
        &self.rows[idx]
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> DatasetResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// A view over every row
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView::new(self, (0..self.rows.len()).collect())
    }

    /// Smallest numeric value in a column
    pub fn min(&self, column: &str) -> DatasetResult<Option<f64>> {
        Ok(self.view().numbers(column)?.into_iter().reduce(f64::min))
    }

    /// Largest numeric value in a column
    pub fn max(&self, column: &str) -> DatasetResult<Option<f64>> {
        Ok(self.view().numbers(column)?.into_iter().reduce(f64::max))
    }
}
