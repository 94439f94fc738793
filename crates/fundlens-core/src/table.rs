//! A small column-named table of JSON values.
//!
//! The wide fact series arrives as a [`QueryResult`]; the valuation and risk
//! sections are carved out of it with [`Table::select`],
//! [`Table::drop_duplicates`] and [`Table::melt`].

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use fundlens_warehouse::QueryResult;

use crate::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl From<QueryResult> for Table {
    fn from(result: QueryResult) -> Self {
        Self {
            columns: result.columns,
            rows: result.rows,
        }
    }
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Value at `row` in column `name`, `None` when either is out of range.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }

    /// Every value of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, CoreError> {
        let index = self.require(name)?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Copy of the table restricted to `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Self, CoreError> {
        let indices = names
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&index| row[index].clone()).collect())
            .collect();

        Ok(Self {
            columns: names.iter().map(|name| (*name).to_string()).collect(),
            rows,
        })
    }

    /// Keep the first occurrence of every distinct row.
    pub fn drop_duplicates(&self) -> Self {
        let mut seen = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| seen.insert(row_key(row)))
            .cloned()
            .collect();

        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Reshape wide to long: one `(column name, value)` row per cell.
    ///
    /// Output is column-major. Every row's value for the first column comes
    /// before any value of the second column.
    pub fn melt(&self, var_name: &str, value_name: &str) -> Self {
        let mut rows = Vec::with_capacity(self.columns.len() * self.rows.len());
        for (index, column) in self.columns.iter().enumerate() {
            for row in &self.rows {
                rows.push(vec![Value::String(column.clone()), row[index].clone()]);
            }
        }

        Self {
            columns: vec![var_name.to_string(), value_name.to_string()],
            rows,
        }
    }

    /// Rename columns found in `labels`; others keep their name.
    pub fn relabel_columns(mut self, labels: &[(&str, &str)]) -> Self {
        for column in &mut self.columns {
            if let Some((_, label)) = labels.iter().find(|(name, _)| name == column) {
                *column = (*label).to_string();
            }
        }
        self
    }

    /// Replace string values of column `name` found in `labels`.
    pub fn relabel_values(mut self, name: &str, labels: &[(&str, &str)]) -> Self {
        let Some(index) = self.column_index(name) else {
            return self;
        };
        for row in &mut self.rows {
            if let Value::String(value) = &row[index] {
                if let Some((_, label)) = labels.iter().find(|(from, _)| from == value) {
                    row[index] = Value::String((*label).to_string());
                }
            }
        }
        self
    }

    fn require(&self, name: &str) -> Result<usize, CoreError> {
        self.column_index(name).ok_or_else(|| CoreError::MissingColumn {
            column: name.to_string(),
        })
    }
}

fn row_key(row: &[Value]) -> String {
    Value::Array(row.to_vec()).to_string()
}

/// Read a JSON value as a float. Numeric strings are accepted.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
