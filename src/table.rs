//! Year-indexed tables with (quantity, region) column labels.
//!
//! The numeric data of an input file is held in a polars `DataFrame` whose
//! first column is `YEAR`. Each remaining frame column carries a
//! [`ColumnLabel`]; since labels may repeat, the frame column names are
//! derived from the labels and suffixed with `#n` when needed.

use crate::constants::YEAR_COLUMN;
use crate::error::{MagiccError, Result};
use crate::models::ColumnLabel;
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;

/// Numeric table indexed by year with two-part column labels
#[derive(Debug, Clone)]
pub struct LabeledTable {
    frame: DataFrame,
    labels: Vec<ColumnLabel>,
    column_names: Vec<String>,
}

impl LabeledTable {
    /// Build a table from column-major data.
    ///
    /// `columns[i]` holds the values of `labels[i]` and must have one value
    /// per year.
    pub fn new(labels: Vec<ColumnLabel>, years: Vec<f64>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != columns.len() {
            return Err(MagiccError::ColumnCountMismatch {
                labels: labels.len(),
                columns: columns.len(),
            });
        }

        let column_names = frame_column_names(&labels);

        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        frame_columns.push(Column::new(YEAR_COLUMN.into(), years));
        for (name, values) in column_names.iter().zip(columns) {
            frame_columns.push(Column::new(name.as_str().into(), values));
        }

        let frame = DataFrame::new(frame_columns)?;

        Ok(Self {
            frame,
            labels,
            column_names,
        })
    }

    /// Underlying frame, `YEAR` first
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn labels(&self) -> &[ColumnLabel] {
        &self.labels
    }

    /// Number of years
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// (years, data columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.labels.len())
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn years(&self) -> Result<Vec<f64>> {
        series_values(self.frame.column(YEAR_COLUMN)?.as_materialized_series())
    }

    /// Distinct quantities in column order
    pub fn quantities(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for label in &self.labels {
            if !seen.contains(&label.quantity.as_str()) {
                seen.push(label.quantity.as_str());
            }
        }
        seen
    }

    /// Distinct regions in column order
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for label in &self.labels {
            if !seen.contains(&label.region.as_str()) {
                seen.push(label.region.as_str());
            }
        }
        seen
    }

    /// Sub-table holding every column of one quantity
    pub fn quantity(&self, quantity: &str) -> Result<LabeledTable> {
        let positions: Vec<usize> = self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.quantity == quantity)
            .map(|(i, _)| i)
            .collect();

        if positions.is_empty() {
            return Err(MagiccError::QuantityNotFound {
                quantity: quantity.to_string(),
            });
        }

        let labels: Vec<ColumnLabel> = positions.iter().map(|&i| self.labels[i].clone()).collect();
        let column_names: Vec<String> = positions
            .iter()
            .map(|&i| self.column_names[i].clone())
            .collect();

        let mut selection = vec![YEAR_COLUMN.to_string()];
        selection.extend(column_names.iter().cloned());
        let frame = self.frame.select(selection)?;

        Ok(Self {
            frame,
            labels,
            column_names,
        })
    }

    /// Series of the first column labelled (quantity, region)
    pub fn column(&self, quantity: &str, region: &str) -> Result<Series> {
        let position = self
            .labels
            .iter()
            .position(|label| label.matches(quantity, region))
            .ok_or_else(|| MagiccError::ColumnNotFound {
                quantity: quantity.to_string(),
                region: region.to_string(),
            })?;

        let column = self.frame.column(&self.column_names[position])?;
        Ok(column.as_materialized_series().clone())
    }

    pub fn values(&self, quantity: &str, region: &str) -> Result<Vec<f64>> {
        series_values(&self.column(quantity, region)?)
    }

    /// Value for one year, `None` when the year is not in the table
    pub fn value(&self, year: f64, quantity: &str, region: &str) -> Result<Option<f64>> {
        let values = self.values(quantity, region)?;
        let row = self.years()?.iter().position(|&y| y == year);
        Ok(row.map(|row| values[row]))
    }

    pub fn sum(&self, quantity: &str, region: &str) -> Result<Option<f64>> {
        let series = self.column(quantity, region)?;
        Ok(series.f64()?.sum())
    }

    pub fn mean(&self, quantity: &str, region: &str) -> Result<Option<f64>> {
        Ok(self.column(quantity, region)?.mean())
    }

    /// Rows whose year lies within `start..=end`
    pub fn between_years(&self, start: f64, end: f64) -> Result<LabeledTable> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(
                col(YEAR_COLUMN)
                    .gt_eq(lit(start))
                    .and(col(YEAR_COLUMN).lt_eq(lit(end))),
            )
            .collect()?;

        Ok(Self {
            frame,
            labels: self.labels.clone(),
            column_names: self.column_names.clone(),
        })
    }

    /// First `rows` rows of the frame
    pub fn head(&self, rows: usize) -> DataFrame {
        self.frame.head(Some(rows))
    }
}

impl fmt::Display for LabeledTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}

/// Frame column names for a list of labels, unique even when labels repeat
fn frame_column_names(labels: &[ColumnLabel]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let base = label.to_string();
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}#{}", base, count)
            }
        })
        .collect()
}

fn series_values(series: &Series) -> Result<Vec<f64>> {
    Ok(series
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}
