//! Raw tabular frame produced by the input readers.

use chrono::NaiveDateTime;

const PLACEHOLDER_PREFIX: &str = "unnamed-";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Empty,
}

impl Cell {
    /// Build a cell from a raw text token: blank → Empty, numeric → Number.
    pub fn from_token(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match parse_number(trimmed) {
            Some(v) => Cell::Number(v),
            None => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Numeric coercion: numbers pass through, numeric-looking text is parsed.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Parse a finite float, tolerating surrounding whitespace and thousands
/// separators written as spaces.
pub fn parse_number(token: &str) -> Option<f64> {
    let cleaned: String = token.trim().chars().filter(|c| *c != ' ').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn placeholder_name(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}")
}

pub fn is_placeholder(name: &str) -> bool {
    name.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn non_empty_values(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.column(index).filter(|c| !c.is_empty())
    }

    /// A column is numeric when it has at least one value and every
    /// non-missing value is a number.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut seen = false;
        for cell in self.non_empty_values(index) {
            if cell.as_number().is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }

    pub fn numeric_values(&self, index: usize) -> Vec<f64> {
        self.column(index).filter_map(Cell::as_number).collect()
    }

    pub fn placeholder_count(&self) -> usize {
        self.columns.iter().filter(|c| is_placeholder(c)).count()
    }

    pub fn null_fraction(&self) -> f64 {
        let total = self.height() * self.width();
        if total == 0 {
            return 0.0;
        }
        let nulls = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_empty())
            .count();
        nulls as f64 / total as f64
    }
}
