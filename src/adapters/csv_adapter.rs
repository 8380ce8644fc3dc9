//! Delimited-table reader.
//!
//! The first column is the temporal index; every other column is kept as
//! cells for the return series builder.

use tracing::debug;

use crate::domain::error::PerfscopeError;
use crate::domain::frame::{parse_number, placeholder_name, Cell, RawFrame};
use crate::domain::input::{InputFormat, RawInput};
use crate::ports::input_port::InputReader;

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Pick the candidate delimiter that occurs most often on the header line.
/// Ties and header lines without any candidate fall back to a comma.
pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or(&[]);

    let mut best = b',';
    let mut best_count = 0;
    for delim in CANDIDATE_DELIMITERS {
        let count = header.iter().filter(|b| **b == delim).count();
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    best
}

fn delimiter_name(delim: u8) -> &'static str {
    match delim {
        b';' => "';'",
        b'\t' => "tab",
        _ => "','",
    }
}

/// Semicolon-delimited exports come from comma-decimal locales, so `1,5`
/// in such a file is the number 1.5.
fn cell_for(token: &str, delimiter: u8) -> Cell {
    let cell = Cell::from_token(token);
    if let Cell::Text(text) = &cell {
        if delimiter == b';' && text.matches(',').count() == 1 {
            if let Some(value) = parse_number(&text.replace(',', ".")) {
                return Cell::Number(value);
            }
        }
    }
    cell
}

impl InputReader for CsvAdapter {
    fn format(&self) -> InputFormat {
        InputFormat::Delimited
    }

    fn read(&self, bytes: &[u8]) -> Result<RawInput, PerfscopeError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let delimiter = sniff_delimiter(bytes);

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = rdr
            .headers()
            .map_err(|e| PerfscopeError::format(format!("CSV header error: {}", e)))?
            .clone();
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    placeholder_name(i)
                } else {
                    h.to_string()
                }
            })
            .collect();
        if columns.is_empty() {
            return Err(PerfscopeError::format("delimited input has no header row"));
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| PerfscopeError::format(format!("CSV parse error: {}", e)))?;
            let row: Vec<Cell> = record
                .iter()
                .map(|token| cell_for(token, delimiter))
                .collect();
            if row.iter().all(Cell::is_empty) {
                continue;
            }
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(PerfscopeError::empty("delimited input has no data rows"));
        }

        debug!(
            delimiter = delimiter_name(delimiter),
            columns = columns.len(),
            rows = rows.len(),
            "read delimited table"
        );

        Ok(RawInput {
            format: InputFormat::Delimited,
            frame: RawFrame::new(columns, rows),
            trades: None,
            detail: format!("delimiter {}", delimiter_name(delimiter)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_delimiters() {
        assert_eq!(sniff_delimiter(b"date,value\n2024-01-01,0.1"), b',');
        assert_eq!(sniff_delimiter(b"date;value;x\n"), b';');
        assert_eq!(sniff_delimiter(b"\n\ndate\tvalue\n"), b'\t');
        assert_eq!(sniff_delimiter(b"value\n1\n"), b',');
    }

    #[test]
    fn reads_returns_table() {
        let input = CsvAdapter::new()
            .read(b"Date,Return\n2024-01-01,0.01\n2024-01-02,-0.02\n\n2024-01-03,n/a\n")
            .unwrap();
        assert_eq!(input.format, InputFormat::Delimited);
        assert_eq!(input.frame.columns, vec!["Date", "Return"]);
        assert_eq!(input.frame.height(), 3);
        assert_eq!(input.frame.rows[1][1], Cell::Number(-0.02));
        assert_eq!(input.frame.rows[2][1], Cell::Text("n/a".into()));
        assert_eq!(input.detail, "delimiter ','");
    }

    #[test]
    fn reads_semicolon_table_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"time;equity\n2024-01-01;10000\n2024-01-02;10100\n");
        let input = CsvAdapter::new().read(&bytes).unwrap();
        assert_eq!(input.frame.columns, vec!["time", "equity"]);
        assert_eq!(input.frame.rows[1][1], Cell::Number(10_100.0));
    }

    #[test]
    fn blank_header_cell_becomes_placeholder() {
        let input = CsvAdapter::new().read(b",value\n2024-01-01,1\n").unwrap();
        assert_eq!(input.frame.columns, vec!["unnamed-0", "value"]);
    }

    #[test]
    fn header_only_is_empty_data() {
        let err = CsvAdapter::new().read(b"date,value\n").unwrap_err();
        assert!(matches!(err, PerfscopeError::EmptyData { .. }));
    }

    #[test]
    fn invalid_utf8_is_format_error() {
        let err = CsvAdapter::new().read(b"date,value\n\xff\xfe,1\n").unwrap_err();
        assert!(matches!(err, PerfscopeError::Format { .. }));
    }

    #[test]
    fn semicolon_table_reads_comma_decimals() {
        let input = CsvAdapter::new()
            .read(b"Ticket;Symbol;Profit\n1;EURUSD;1,5\n2;GBPUSD;-12,25\n3;USD,JPY;3\n")
            .unwrap();
        assert_eq!(input.frame.rows[0][2], Cell::Number(1.5));
        assert_eq!(input.frame.rows[1][2], Cell::Number(-12.25));
        assert_eq!(input.frame.rows[2][1], Cell::Text("USD,JPY".into()));
        assert!(input.frame.is_numeric_column(2));
    }

    #[test]
    fn comma_table_keeps_quoted_comma_text() {
        let input = CsvAdapter::new()
            .read(b"date,note\n2024-01-01,\"1,5\"\n")
            .unwrap();
        assert_eq!(input.frame.rows[0][1], Cell::Text("1,5".into()));
    }
}
