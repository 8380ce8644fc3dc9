//! Concrete adapter implementations for ports, plus the load entry points
//! that tie format detection to a reader and the session builder.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
pub mod spreadsheet_adapter;
pub mod xml_adapter;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::PerfscopeError;
use crate::domain::session::SessionResult;
use crate::domain::input::{InputFormat, RawInput};
use crate::ports::input_port::InputReader;

use csv_adapter::CsvAdapter;
use spreadsheet_adapter::SpreadsheetAdapter;
use xml_adapter::XmlAdapter;

pub fn reader_for(format: InputFormat) -> Box<dyn InputReader> {
    match format {
        InputFormat::Delimited => Box::new(CsvAdapter::new()),
        InputFormat::Spreadsheet => Box::new(SpreadsheetAdapter::new()),
        InputFormat::Xml => Box::new(XmlAdapter::new()),
    }
}

/// Read `bytes` with the reader chosen from `name`'s extension, without
/// building a session.
pub fn read_bytes(name: &str, bytes: &[u8]) -> Result<RawInput, PerfscopeError> {
    let format = InputFormat::detect(name);
    info!(name, %format, bytes = bytes.len(), "reading input");
    reader_for(format).read(bytes)
}

pub fn load_bytes(
    name: &str,
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<SessionResult, PerfscopeError> {
    SessionResult::from_input(read_bytes(name, bytes)?, config)
}

pub fn read_path<P: AsRef<Path>>(path: P) -> Result<RawInput, PerfscopeError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    read_bytes(&path.to_string_lossy(), &bytes)
}

pub fn load_path<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
) -> Result<SessionResult, PerfscopeError> {
    SessionResult::from_input(read_path(path)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns::DataMode;

    #[test]
    fn reader_matches_format() {
        for format in [InputFormat::Delimited, InputFormat::Spreadsheet, InputFormat::Xml] {
            assert_eq!(reader_for(format).format(), format);
        }
    }

    #[test]
    fn load_bytes_dispatches_on_name() {
        let xml = br#"<Trades><Trade Profit="10"/><Trade Profit="-4"/></Trades>"#;
        let session = load_bytes("upload.XML", xml, &AnalysisConfig::default()).unwrap();
        assert_eq!(session.format, InputFormat::Xml);
        assert_eq!(session.mode, DataMode::Trades);
        assert_eq!(session.trades.as_ref().map(Vec::len), Some(2));

        let csv = b"date,ret\n2024-01-01,0.01\n2024-01-02,0.02\n";
        let session = load_bytes("returns.csv", csv, &AnalysisConfig::default()).unwrap();
        assert_eq!(session.format, InputFormat::Delimited);
        assert_eq!(session.returns.len(), 2);
    }

    #[test]
    fn xml_name_with_csv_body_is_format_error() {
        let err = load_bytes("x.xml", b"date,ret\n", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, PerfscopeError::Format { .. }));
    }

    #[test]
    fn missing_path_is_io_error() {
        let err = load_path("/nonexistent/input.csv", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, PerfscopeError::Io(_)));
    }
}
