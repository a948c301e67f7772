use crate::core::error::{Error, Result};

/// Enum to identify column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Float64,
    String,
}

/// Enum representing a column
///
/// Missing numeric values are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Vec<f64>),
    String(Vec<String>),
}

impl Column {
    /// Returns the length of the column
    pub fn len(&self) -> usize {
        match self {
            Column::Float64(values) => values.len(),
            Column::String(values) => values.len(),
        }
    }

    /// Returns whether the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type of the column
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
        }
    }

    /// Borrow the numeric values, failing on a string column
    pub fn as_f64(&self, name: &str) -> Result<&[f64]> {
        match self {
            Column::Float64(values) => Ok(values),
            Column::String(_) => Err(Error::ColumnTypeMismatch {
                name: name.to_string(),
                expected: ColumnType::Float64,
                found: ColumnType::String,
            }),
        }
    }

    /// Render the value at `row` as a label
    ///
    /// Numeric labels drop a trailing `.0` so that integer-coded factors
    /// read naturally (`1` rather than `1.0`).
    pub fn label_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Float64(values) => values.get(row).map(|v| format_label(*v)),
            Column::String(values) => values.get(row).cloned(),
        }
    }
}

fn format_label(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float64(values)
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::String(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::String(values.into_iter().map(str::to_string).collect())
    }
}
