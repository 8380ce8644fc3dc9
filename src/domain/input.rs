//! Input formats and what a reader hands to the session builder.

use std::fmt;
use std::path::Path;

use super::frame::RawFrame;
use super::returns::DataMode;
use super::trade::TradeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Spreadsheet,
    Xml,
}

impl InputFormat {
    pub const SPREADSHEET_EXTENSIONS: [&'static str; 4] = ["xlsx", "xlsm", "xls", "ods"];

    /// Chooses a reader by file extension, case-insensitively. Unknown or
    /// missing extensions are read as delimited text.
    pub fn detect<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if ext == "xml" {
            InputFormat::Xml
        } else if Self::SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            InputFormat::Spreadsheet
        } else {
            InputFormat::Delimited
        }
    }

    /// Spreadsheet and XML input is always trade records.
    pub fn forced_mode(self) -> Option<DataMode> {
        match self {
            InputFormat::Delimited => None,
            InputFormat::Spreadsheet | InputFormat::Xml => Some(DataMode::Trades),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Delimited => write!(f, "delimited"),
            InputFormat::Spreadsheet => write!(f, "spreadsheet"),
            InputFormat::Xml => write!(f, "xml"),
        }
    }
}

/// What a reader produced from one input blob.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub format: InputFormat,
    pub frame: RawFrame,
    /// Present when the reader extracted canonical records itself (XML).
    pub trades: Option<Vec<TradeRecord>>,
    /// Reader-specific choice worth reporting: delimiter, header row, dialect.
    pub detail: String,
}
