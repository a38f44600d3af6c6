//! Filtered views over a dataset
//!
//! Views borrow the dataset and hold row positions only; every filter returns
//! a new view and leaves the source untouched.

use serde_json::Value;

use super::error::{DatasetError, DatasetResult};
use super::table::{Cell, Dataset};

/// A borrowed row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

/// Subset of a dataset's rows, in source order
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    pub(crate) fn new(dataset: &'a Dataset, rows: Vec<usize>) -> Self {
        Self { dataset, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &'a [String] {
        self.dataset.columns()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
        let dataset = self.dataset;
        self.rows.iter().map(move |&idx| Row {
            cells: dataset.row(idx),
        })
    }

    /// Keep rows matching a predicate
    pub fn filter<F>(&self, predicate: F) -> DatasetView<'a>
    where
        F: Fn(&Row<'a>) -> bool,
    {
        let dataset = self.dataset;
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&idx| {
                predicate(&Row {
                    cells: dataset.row(idx),
                })
            })
            .collect();
        DatasetView::new(dataset, rows)
    }

    /// Keep rows whose cell in `column` equals `value`
    pub fn filter_eq(&self, column: &str, value: &Cell) -> DatasetResult<DatasetView<'a>> {
        let col = self.dataset.column_index(column)?;
        Ok(self.filter(|row| &row.cells[col] == value))
    }

    /// Keep rows whose cell in `column` is a number `>= threshold`
    pub fn filter_ge(&self, column: &str, threshold: f64) -> DatasetResult<DatasetView<'a>> {
        let col = self.dataset.column_index(column)?;
        Ok(self.filter(|row| {
            row.cells[col]
                .as_f64()
                .map(|n| n >= threshold)
                .unwrap_or(false)
        }))
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> DatasetView<'a> {
        DatasetView::new(self.dataset, self.rows.iter().copied().take(n).collect())
    }

    /// Cells of one column
    pub fn cells(&self, column: &str) -> DatasetResult<Vec<&'a Cell>> {
        let col = self.dataset.column_index(column)?;
        Ok(self.rows().map(|row| &row.cells()[col]).collect())
    }

    /// Column cells as JSON values, aligned with the view's rows
    pub fn values(&self, column: &str) -> DatasetResult<Vec<Value>> {
        Ok(self.cells(column)?.into_iter().map(Cell::to_value).collect())
    }

    /// Numeric cells of one column; blanks are skipped, text is an error
    pub fn numbers(&self, column: &str) -> DatasetResult<Vec<f64>> {
        let col = self.dataset.column_index(column)?;
        let mut out = Vec::with_capacity(self.rows.len());
        for (pos, row) in self.rows().enumerate() {
            match &row.cells()[col] {
                Cell::Number(n) => out.push(*n),
                Cell::Empty => {}
                Cell::Text(found) => {
                    return Err(DatasetError::TypeMismatch {
                        column: column.to_string(),
                        row: self.rows[pos],
                        found: found.clone(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Distinct values of one column, in order of first appearance
    pub fn unique(&self, column: &str) -> DatasetResult<Vec<Cell>> {
        let mut seen: Vec<Cell> = Vec::new();
        for cell in self.cells(column)? {
            if !seen.contains(cell) {
                seen.push(cell.clone());
            }
        }
        Ok(seen)
    }
}
