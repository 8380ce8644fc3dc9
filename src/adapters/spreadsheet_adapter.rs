//! Spreadsheet reader (xlsx, xlsm, xls, ods) driven by the header scorer.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::{debug, info};

use crate::domain::error::PerfscopeError;
use crate::domain::frame::{parse_number, Cell};
use crate::domain::header_score::{select_header, HeaderScorer, WeightedHeaderScorer};
use crate::domain::normalize::normalize_columns;
use crate::domain::input::{InputFormat, RawInput};
use crate::ports::input_port::InputReader;

pub struct SpreadsheetAdapter<S: HeaderScorer = WeightedHeaderScorer> {
    scorer: S,
}

impl SpreadsheetAdapter {
    pub fn new() -> Self {
        Self {
            scorer: WeightedHeaderScorer,
        }
    }
}

impl Default for SpreadsheetAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: HeaderScorer> SpreadsheetAdapter<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Header selection and column recovery over an already-decoded grid.
    pub fn input_from_grid(&self, grid: &[Vec<Cell>]) -> Result<RawInput, PerfscopeError> {
        let selection = select_header(grid, &self.scorer)
            .ok_or_else(|| PerfscopeError::empty("spreadsheet has no data rows"))?;
        info!(
            header = %selection.choice,
            score = selection.score,
            "spreadsheet header selected"
        );

        let frame = normalize_columns(selection.frame);
        debug!(columns = ?frame.columns, "spreadsheet columns after normalization");

        Ok(RawInput {
            format: InputFormat::Spreadsheet,
            frame,
            trades: None,
            detail: format!("header {} (score {:.1})", selection.choice, selection.score),
        })
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) if v.is_finite() => Cell::Number(*v),
        Data::Float(_) => Cell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                match parse_number(trimmed) {
                    Some(v) => Cell::Number(v),
                    None => Cell::Text(trimmed.to_string()),
                }
            }
        }
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(when) => Cell::DateTime(when),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

impl<S: HeaderScorer> InputReader for SpreadsheetAdapter<S> {
    fn format(&self) -> InputFormat {
        InputFormat::Spreadsheet
    }

    fn read(&self, bytes: &[u8]) -> Result<RawInput, PerfscopeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| PerfscopeError::format(format!("cannot open spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PerfscopeError::empty("spreadsheet has no worksheets"))?
            .map_err(|e| PerfscopeError::format(format!("cannot read first worksheet: {}", e)))?;

        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        debug!(rows = grid.len(), "decoded first worksheet");

        self.input_from_grid(&grid)
    }
}
