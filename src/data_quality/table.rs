//! Tabular row sets decoded from JSON records.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::AssessmentError;

/// Text values that count as missing, compared case-insensitively after trimming.
pub const NULL_TOKENS: &[&str] = &["", "null", "na", "n/a", "nan", "none"];

/// One cell. Text is stored trimmed; null tokens collapse to `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Cell for a JSON string value: trimmed, with the null tokens mapped
    /// to [`Cell::Null`]. Numbers inside the text are parsed on demand.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NULL_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        {
            Cell::Null
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::from_text(s),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Finite numeric value, parsing text cells.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Cell::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equality key used for duplicate detection. Numbers compare by value
    /// (`"1.0"` equals `1`); text is case-sensitive.
    pub fn canonical(&self) -> String {
        if let Some(n) = self.as_number() {
            // Normalize -0.0.
            let n = if n == 0.0 { 0.0 } else { n };
            return format!("n:{}", n);
        }
        match self {
            Cell::Null => "null".to_string(),
            Cell::Bool(b) => format!("b:{}", b),
            Cell::Text(s) => format!("t:{}", s),
            Cell::Number(n) => format!("n:{}", n),
        }
    }
}

/// Named columns and rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding short rows with nulls.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, AssessmentError> {
        let width = columns.len();
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(AssessmentError::InvalidInput(format!(
                    "duplicate column '{}'",
                    column
                )));
            }
        }
        let mut padded = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(AssessmentError::InvalidInput(format!(
                    "row {} has {} cells but the table has {} columns",
                    i + 1,
                    row.len(),
                    width
                )));
            }
            row.resize(width, Cell::Null);
            padded.push(row);
        }
        Ok(Self {
            columns,
            rows: padded,
        })
    }

    /// Build a table from JSON objects. Columns appear in order of first
    /// occurrence; a record missing a column gets a null there.
    pub fn from_records(records: &[Value]) -> Result<Self, AssessmentError> {
        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                AssessmentError::InvalidInput(format!("record {} is not a JSON object", i + 1))
            })?;
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|c| object.get(c).map(Cell::from_json).unwrap_or(Cell::Null))
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    /// Parse a JSON array of records, or newline-delimited records.
    pub fn from_json(content: &str) -> Result<Self, AssessmentError> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            let records: Vec<Value> = serde_json::from_str(trimmed).map_err(|e| {
                AssessmentError::InvalidInput(format!("invalid JSON records: {}", e))
            })?;
            return Self::from_records(&records);
        }

        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Value = serde_json::from_str(line).map_err(|e| {
                AssessmentError::InvalidInput(format!("invalid record on line {}: {}", i + 1, e))
            })?;
            records.push(record);
        }
        Self::from_records(&records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
