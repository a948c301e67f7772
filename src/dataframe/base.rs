use std::collections::{HashMap, HashSet};

use crate::core::column::{Column, ColumnType};
use crate::core::error::{Error, Result};

/// DataFrame struct: Column-oriented 2D data structure
///
/// Holds numeric (`Float64`, with `NaN` marking a missing value) and
/// string columns of equal length. This is the input of every pairwise
/// routine in the crate.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    columns: HashMap<String, Column>,
    column_order: Vec<String>,
    row_count: usize,
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the DataFrame contains a column with the given name
    pub fn contains_column(&self, column_name: &str) -> bool {
        self.columns.contains_key(column_name)
    }

    /// Get the number of rows in the DataFrame
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in the DataFrame
    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }

    /// Get column names in insertion order
    pub fn column_names(&self) -> Vec<String> {
        self.column_order.clone()
    }

    /// Add a column to the DataFrame
    pub fn add_column(&mut self, column_name: impl Into<String>, column: Column) -> Result<()> {
        let column_name = column_name.into();
        if self.contains_column(&column_name) {
            return Err(Error::DuplicateColumnName(column_name));
        }

        let len = column.len();
        if !self.columns.is_empty() && len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: len,
            });
        }

        self.columns.insert(column_name.clone(), column);
        self.column_order.push(column_name);

        if self.columns.len() == 1 {
            self.row_count = len;
        }

        Ok(())
    }

    /// Add a numeric column
    pub fn add_float_column(&mut self, column_name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.add_column(column_name, Column::Float64(values))
    }

    /// Add a string (categorical) column
    pub fn add_string_column<S: Into<String>>(
        &mut self,
        column_name: impl Into<String>,
        values: Vec<S>,
    ) -> Result<()> {
        let values = values.into_iter().map(Into::into).collect();
        self.add_column(column_name, Column::String(values))
    }

    /// Borrow a column by name
    pub fn column(&self, column_name: &str) -> Result<&Column> {
        self.columns
            .get(column_name)
            .ok_or_else(|| Error::ColumnNotFound(column_name.to_string()))
    }

    /// Get the type of a column
    pub fn column_type(&self, column_name: &str) -> Result<ColumnType> {
        self.column(column_name).map(Column::column_type)
    }

    /// Check whether a column holds numeric values
    pub fn is_numeric_column(&self, column_name: &str) -> bool {
        matches!(self.columns.get(column_name), Some(Column::Float64(_)))
    }

    /// Names of all numeric columns, in insertion order
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.column_order
            .iter()
            .filter(|name| self.is_numeric_column(name))
            .cloned()
            .collect()
    }

    /// Get numeric values from a column
    pub fn get_column_numeric_values(&self, column_name: &str) -> Result<Vec<f64>> {
        self.column(column_name)?
            .as_f64(column_name)
            .map(<[f64]>::to_vec)
    }

    /// Get values from a column rendered as string labels
    pub fn get_column_string_values(&self, column_name: &str) -> Result<Vec<String>> {
        let column = self.column(column_name)?;
        Ok(match column {
            Column::String(values) => values.clone(),
            Column::Float64(_) => (0..column.len())
                .filter_map(|row| column.label_at(row))
                .collect(),
        })
    }

    /// Unique labels of a column, in order of first appearance
    pub fn unique_values(&self, column_name: &str) -> Result<Vec<String>> {
        let labels = self.get_column_string_values(column_name)?;
        let mut seen = HashSet::new();
        Ok(labels
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect())
    }

    /// Set a single numeric value (use `f64::NAN` to mark it missing)
    pub fn set_numeric_value(&mut self, column_name: &str, row: usize, value: f64) -> Result<()> {
        let size = self.row_count;
        match self.columns.get_mut(column_name) {
            Some(Column::Float64(values)) => {
                let slot = values
                    .get_mut(row)
                    .ok_or(Error::IndexOutOfBounds { index: row, size })?;
                *slot = value;
                Ok(())
            }
            Some(Column::String(_)) => Err(Error::ColumnTypeMismatch {
                name: column_name.to_string(),
                expected: ColumnType::Float64,
                found: ColumnType::String,
            }),
            None => Err(Error::ColumnNotFound(column_name.to_string())),
        }
    }

    /// Overwrite every entry of a column with the same label
    pub fn fill_string_column(&mut self, column_name: &str, value: &str) -> Result<()> {
        let row_count = self.row_count;
        let column = self
            .columns
            .get_mut(column_name)
            .ok_or_else(|| Error::ColumnNotFound(column_name.to_string()))?;
        *column = Column::String(vec![value.to_string(); row_count]);
        Ok(())
    }

    /// Group the numeric values of `value_column` by the labels of `key_column`
    ///
    /// Groups keep the order of first appearance and every value, including
    /// missing ones, so that positional pairing across groups stays intact.
    pub fn group_values(&self, value_column: &str, key_column: &str) -> Result<Vec<(String, Vec<f64>)>> {
        let values = self.column(value_column)?.as_f64(value_column)?;
        let keys = self.get_column_string_values(key_column)?;

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
        for (key, &value) in keys.into_iter().zip(values.iter()) {
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(value);
        }

        Ok(order
            .into_iter()
            .map(|key| {
                let values = groups.remove(&key).unwrap_or_default();
                (key, values)
            })
            .collect())
    }

    /// Keep only the rows for which `predicate` holds
    pub fn filter_rows<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(usize) -> bool,
    {
        let keep: Vec<usize> = (0..self.row_count).filter(|&row| predicate(row)).collect();
        let mut result = Self::new();
        for name in &self.column_order {
            let column = match self.column(name)? {
                Column::Float64(values) => Column::Float64(keep.iter().map(|&i| values[i]).collect()),
                Column::String(values) => {
                    Column::String(keep.iter().map(|&i| values[i].clone()).collect())
                }
            };
            result.add_column(name.clone(), column)?;
        }
        Ok(result)
    }
}
