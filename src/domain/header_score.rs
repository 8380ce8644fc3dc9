//! Header-row selection for spreadsheet exports.
//!
//! Exported trading spreadsheets often carry banner rows or shifted headers,
//! so the reader builds one frame per [`HeaderChoice`] and keeps the best
//! scoring one. Scoring sits behind [`HeaderScorer`] so the heuristic can be
//! swapped without touching the selection loop.

use std::fmt;

use tracing::debug;

use super::frame::{placeholder_name, Cell, RawFrame};

/// Column-name fragments that indicate a trading export header.
pub const TRADING_VOCABULARY: [&str; 6] = ["profit", "pnl", "symbol", "time", "date", "volume"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderChoice {
    Row(usize),
    None,
}

impl HeaderChoice {
    pub const CANDIDATES: [HeaderChoice; 4] = [
        HeaderChoice::Row(0),
        HeaderChoice::Row(1),
        HeaderChoice::Row(2),
        HeaderChoice::None,
    ];
}

impl fmt::Display for HeaderChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderChoice::Row(i) => write!(f, "row {}", i),
            HeaderChoice::None => write!(f, "none"),
        }
    }
}

pub trait HeaderScorer {
    fn score(&self, frame: &RawFrame) -> f64;
}

/// Fixed weighted formula:
/// `-10·placeholders + 20·recognized + 5·numeric - 50·null_fraction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedHeaderScorer;

impl HeaderScorer for WeightedHeaderScorer {
    fn score(&self, frame: &RawFrame) -> f64 {
        let placeholders = frame.placeholder_count() as f64;
        let recognized = frame
            .columns
            .iter()
            .filter(|name| is_recognized(name))
            .count() as f64;
        let numeric = (0..frame.width())
            .filter(|&i| frame.is_numeric_column(i))
            .count() as f64;

        -10.0 * placeholders + 20.0 * recognized + 5.0 * numeric - 50.0 * frame.null_fraction()
    }
}

fn is_recognized(name: &str) -> bool {
    let lower = name.to_lowercase();
    TRADING_VOCABULARY.iter().any(|word| lower.contains(word))
}

#[derive(Debug, Clone)]
pub struct HeaderSelection {
    pub choice: HeaderChoice,
    pub score: f64,
    pub frame: RawFrame,
}

/// Build the frame that results from reading `grid` with the given header.
///
/// Returns `None` when the header row does not exist or nothing remains
/// below it.
pub fn frame_with_header(grid: &[Vec<Cell>], choice: HeaderChoice) -> Option<RawFrame> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return None;
    }

    let (columns, data_start) = match choice {
        HeaderChoice::Row(i) => {
            let header = grid.get(i)?;
            let columns = (0..width)
                .map(|col| match header.get(col) {
                    Some(Cell::Empty) | None => placeholder_name(col),
                    Some(cell) => cell.as_text(),
                })
                .collect();
            (columns, i + 1)
        }
        HeaderChoice::None => ((0..width).map(placeholder_name).collect(), 0),
    };

    let rows: Vec<Vec<Cell>> = grid
        .iter()
        .skip(data_start)
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .cloned()
        .collect();

    let frame = RawFrame::new(columns, rows);
    if frame.is_empty() {
        None
    } else {
        Some(frame)
    }
}

/// Try every header candidate and keep the highest scoring non-empty frame.
/// Ties keep the earlier candidate.
pub fn select_header<S: HeaderScorer + ?Sized>(
    grid: &[Vec<Cell>],
    scorer: &S,
) -> Option<HeaderSelection> {
    let mut best: Option<HeaderSelection> = None;

    for choice in HeaderChoice::CANDIDATES {
        let Some(frame) = frame_with_header(grid, choice) else {
            debug!(header = %choice, "header candidate skipped");
            continue;
        };
        let score = scorer.score(&frame);
        debug!(header = %choice, score, "header candidate scored");

        let better = best.as_ref().is_none_or(|b| score > b.score);
        if better {
            best = Some(HeaderSelection {
                choice,
                score,
                frame,
            });
        }
    }

    best
}
