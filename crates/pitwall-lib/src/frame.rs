//! Ordered column table flowing through the feature pipeline
//!
//! A `Frame` is a small column-major table with `serde_json::Value` cells
//! (null / bool / number / string). Column order is significant: the
//! training orchestrator captures the feature schema from it, and the
//! reconciler reproduces it at inference time.

use serde_json::Value;

/// One named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ordered, column-major table of heterogeneous cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from (name, values) pairs. All columns must have the
    /// same length; violations are programmer error.
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Self {
        let mut frame = Self::new();
        for (name, values) in columns {
            frame.set_column(name, values);
        }
        frame
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Insert a column, replacing in place if the name already exists
    /// (position preserved), appending at the end otherwise.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        if !self.columns.is_empty() {
            assert_eq!(
                values.len(),
                self.num_rows(),
                "column {} length mismatch",
                name
            );
        }
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == name) {
            col.values = values;
        } else {
            self.columns.push(Column { name, values });
        }
    }

    /// Remove a column and return its cells, if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx).values)
    }

    /// Rename a column in place. Returns false when absent.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(col) => {
                col.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Apply a cell transform to one column, if present.
    pub fn map_column<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> Value,
    {
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == name) {
            col.values = col.values.iter().map(|v| f(v)).collect();
        }
    }
}

/// Interpret a cell as a number: JSON numbers pass through, booleans map
/// to 0/1, numeric-looking strings are parsed.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numeric coercion with the neutral default: anything that does not
/// parse becomes 0. This is the agreed defaulting policy, not incidental
/// error suppression.
pub fn coerce_f64(value: &Value) -> f64 {
    as_f64(value).unwrap_or(0.0)
}

pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Wrap an f64 as a JSON number cell; non-finite values become null.
pub fn num(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
