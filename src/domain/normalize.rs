//! Recovery of placeholder column labels from cell content.
//!
//! Only `unnamed-N` columns are ever relabeled, which keeps the pass
//! idempotent on frames that already carry real labels.

use tracing::debug;

use super::frame::{is_placeholder, Cell, RawFrame};
use super::returns::PROFIT_COLUMN_CANDIDATES;

const SAMPLE_SIZE: usize = 10;
const SYMBOL_MAX_LEN: usize = 10;
const TIME_MIN_LEN: usize = 5;
const TIME_MARKERS: [&str; 4] = ["202", "201", ":", "-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Profit,
    Volume,
    Time,
    Symbol,
}

impl ColumnKind {
    fn label(self) -> &'static str {
        match self {
            ColumnKind::Profit => "profit",
            ColumnKind::Volume => "volume",
            ColumnKind::Time => "time",
            ColumnKind::Symbol => "symbol",
        }
    }
}

fn classify(sample: &[&Cell]) -> Option<ColumnKind> {
    let first = sample.first()?;

    let numbers: Vec<f64> = sample.iter().filter_map(|c| c.as_number()).collect();
    if numbers.len() == sample.len() {
        let has_pos = numbers.iter().any(|v| *v > 0.0);
        let has_neg = numbers.iter().any(|v| *v < 0.0);
        if has_pos && has_neg {
            return Some(ColumnKind::Profit);
        }
        if has_pos && numbers.iter().all(|v| *v >= 0.0) {
            return Some(ColumnKind::Volume);
        }
        return None;
    }

    match first {
        Cell::DateTime(_) => return Some(ColumnKind::Time),
        Cell::Text(s) if s.chars().count() > TIME_MIN_LEN => {
            let lower = s.to_lowercase();
            if TIME_MARKERS.iter().any(|m| lower.contains(m)) {
                return Some(ColumnKind::Time);
            }
        }
        _ => {}
    }

    let all_short_text = sample.iter().all(|c| match c {
        Cell::Text(s) => s.chars().count() < SYMBOL_MAX_LEN,
        _ => false,
    });
    if all_short_text {
        return Some(ColumnKind::Symbol);
    }

    None
}

fn has_profit_like(frame: &RawFrame) -> bool {
    frame.columns.iter().any(|name| {
        PROFIT_COLUMN_CANDIDATES
            .iter()
            .any(|cand| cand.eq_ignore_ascii_case(name))
    })
}

fn has_label(frame: &RawFrame, label: &str) -> bool {
    frame.column_index_ignore_case(label).is_some()
}

/// Rename placeholder columns by sniffing their content.
pub fn normalize_columns(mut frame: RawFrame) -> RawFrame {
    for index in 0..frame.width() {
        if !is_placeholder(&frame.columns[index]) {
            continue;
        }

        let sample: Vec<&Cell> = frame.non_empty_values(index).take(SAMPLE_SIZE).collect();
        let Some(kind) = classify(&sample) else {
            continue;
        };

        let allowed = match kind {
            ColumnKind::Profit => !has_profit_like(&frame),
            ColumnKind::Volume => !has_label(&frame, "volume"),
            ColumnKind::Symbol => !has_label(&frame, "symbol"),
            ColumnKind::Time => true,
        };
        if allowed {
            debug!(
                from = %frame.columns[index],
                to = kind.label(),
                "relabeled placeholder column"
            );
            frame.columns[index] = kind.label().to_string();
        }
    }
    frame
}
