//! Broker XML trade logs.
//!
//! The root tag selects an [`XmlDialect`]; each dialect turns the document
//! into canonical [`TradeRecord`]s, which are also rendered as a frame for
//! the trades-mode return builder.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::domain::datetime::parse_datetime;
use crate::domain::error::{ParseError, PerfscopeError};
use crate::domain::frame::{parse_number, Cell, RawFrame};
use crate::domain::trade::{TradeField, TradeRecord};
use crate::domain::input::{InputFormat, RawInput};
use crate::ports::input_port::InputReader;

/// Attribute names tried in order for each field; the first one present wins.
type AttributeMap = [(TradeField, &'static [&'static str]); 11];

const STANDARD_ATTRIBUTES: AttributeMap = [
    (TradeField::Symbol, &["Symbol", "symbol"]),
    (TradeField::Ticket, &["Ticket", "ticket"]),
    (TradeField::Side, &["Type", "type"]),
    (TradeField::Volume, &["Volume", "volume"]),
    (TradeField::OpenPrice, &["OpenPrice", "open_price"]),
    (TradeField::ClosePrice, &["ClosePrice", "close_price"]),
    (TradeField::Profit, &["Profit", "profit"]),
    (TradeField::Commission, &["Commission", "commission"]),
    (TradeField::Swap, &["Swap", "swap"]),
    (TradeField::TimeOpen, &["TimeOpen", "time_open", "OpenTime"]),
    (TradeField::TimeClose, &["TimeClose", "time_close", "CloseTime"]),
];

const CTRADER_ATTRIBUTES: AttributeMap = [
    (TradeField::Symbol, &["Symbol"]),
    (TradeField::Ticket, &["PositionId", "Id"]),
    (TradeField::Side, &["TradeSide", "Side"]),
    (TradeField::Volume, &["Volume"]),
    (TradeField::OpenPrice, &["EntryPrice"]),
    (TradeField::ClosePrice, &["ClosingPrice"]),
    (TradeField::Profit, &["GrossProfit", "NetProfit"]),
    (TradeField::Commission, &["Commission"]),
    (TradeField::Swap, &["Swap"]),
    (TradeField::TimeOpen, &["EntryTime", "OpenTime"]),
    (TradeField::TimeClose, &["ExitTime", "CloseTime"]),
];

const GENERIC_RECORD_TAGS: [&str; 4] = ["trade", "position", "order", "deal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlDialect {
    /// MT4/MT5 style: `<Trade>` elements under History/Report/Trades.
    Standard,
    /// cTrader style: `<Position>` elements.
    CTrader,
    /// Any other root: scan for trade-like elements by tag.
    Generic,
}

impl XmlDialect {
    pub fn detect(root_tag: &str) -> Self {
        match root_tag {
            "History" | "Report" | "Trades" => XmlDialect::Standard,
            "cTraderReport" | "TradingHistory" => XmlDialect::CTrader,
            _ => XmlDialect::Generic,
        }
    }

    pub fn extract(self, root: Node<'_, '_>) -> Vec<TradeRecord> {
        match self {
            XmlDialect::Standard => extract_tagged(root, "Trade", &STANDARD_ATTRIBUTES),
            XmlDialect::CTrader => extract_tagged(root, "Position", &CTRADER_ATTRIBUTES),
            XmlDialect::Generic => extract_generic(root),
        }
    }
}

impl fmt::Display for XmlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlDialect::Standard => write!(f, "standard"),
            XmlDialect::CTrader => write!(f, "ctrader"),
            XmlDialect::Generic => write!(f, "generic"),
        }
    }
}

/// Parse a numeric attribute; anything unparseable becomes 0.
fn number_or_zero(token: &str) -> f64 {
    match parse_number(token) {
        Some(v) => v,
        None => {
            let err = ParseError::number(token);
            debug!(%err, "numeric field defaulted to 0");
            0.0
        }
    }
}

fn assign(record: &mut TradeRecord, field: TradeField, value: &str) {
    match field {
        TradeField::Symbol => record.symbol = value.to_string(),
        TradeField::Ticket => record.ticket = value.to_string(),
        TradeField::Side => record.side = value.to_string(),
        TradeField::Volume => record.volume = number_or_zero(value),
        TradeField::OpenPrice => record.open_price = number_or_zero(value),
        TradeField::ClosePrice => record.close_price = number_or_zero(value),
        TradeField::Profit => record.profit = number_or_zero(value),
        TradeField::Commission => record.commission = number_or_zero(value),
        TradeField::Swap => record.swap = number_or_zero(value),
        TradeField::TimeOpen => record.time_open = parse_datetime(value),
        TradeField::TimeClose => record.time_close = parse_datetime(value),
    }
}

fn extract_tagged(root: Node<'_, '_>, tag: &str, attributes: &AttributeMap) -> Vec<TradeRecord> {
    root.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == tag)
        .map(|node| {
            let mut record = TradeRecord::default();
            for (field, names) in attributes {
                if let Some(value) = names.iter().find_map(|name| node.attribute(*name)) {
                    assign(&mut record, *field, value);
                }
            }
            record
        })
        .collect()
}

fn extract_generic(root: Node<'_, '_>) -> Vec<TradeRecord> {
    root.descendants()
        .filter(|n| {
            n.is_element()
                && GENERIC_RECORD_TAGS.contains(&n.tag_name().name().to_lowercase().as_str())
        })
        .filter_map(|node| {
            let mut record = TradeRecord::default();
            let mut mapped = 0;

            for attr in node.attributes() {
                if let Some(field) = TradeField::from_synonym(&attr.name().to_lowercase()) {
                    assign(&mut record, field, attr.value());
                    mapped += 1;
                }
            }
            for child in node.children().filter(Node::is_element) {
                let text = child.text().map(str::trim).unwrap_or_default();
                if text.is_empty() {
                    continue;
                }
                if let Some(field) = TradeField::from_synonym(&child.tag_name().name().to_lowercase())
                {
                    assign(&mut record, field, text);
                    mapped += 1;
                }
            }

            (mapped > 0).then_some(record)
        })
        .collect()
}

/// Render records as the canonical trades frame.
pub fn records_to_frame(records: &[TradeRecord]) -> RawFrame {
    let with_open = records.iter().any(|r| r.time_open.is_some());
    let with_close = records.iter().any(|r| r.time_close.is_some());

    let mut columns: Vec<String> = [
        "symbol",
        "ticket",
        "type",
        "volume",
        "open_price",
        "close_price",
        "profit",
        "commission",
        "swap",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    if with_open {
        columns.push("time_open".into());
    }
    if with_close {
        columns.push("time_close".into());
    }

    let time_cell = |t: Option<chrono::NaiveDateTime>| t.map_or(Cell::Empty, Cell::DateTime);
    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![
                Cell::Text(r.symbol.clone()),
                Cell::Text(r.ticket.clone()),
                Cell::Text(r.side.clone()),
                Cell::Number(r.volume),
                Cell::Number(r.open_price),
                Cell::Number(r.close_price),
                Cell::Number(r.profit),
                Cell::Number(r.commission),
                Cell::Number(r.swap),
            ];
            if with_open {
                row.push(time_cell(r.time_open));
            }
            if with_close {
                row.push(time_cell(r.time_close));
            }
            row
        })
        .collect();

    RawFrame::new(columns, rows)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlAdapter;

impl XmlAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Decode the document to text. A byte-order mark wins, then the
/// `encoding` pseudo-attribute of the XML declaration, then UTF-8.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, PerfscopeError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let declared = declared_encoding(bytes)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                // A UTF-16 label on ASCII-readable bytes is a lie; read as UTF-8.
                .map(Encoding::output_encoding)
                .unwrap_or(UTF_8);
            (declared, bytes)
        }
    };

    if encoding == UTF_8 {
        return std::str::from_utf8(body)
            .map(Cow::Borrowed)
            .map_err(|e| PerfscopeError::format(format!("XML is not valid UTF-8: {}", e)));
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(PerfscopeError::format(format!(
            "XML is not valid {}",
            encoding.name()
        )));
    }
    debug!(encoding = encoding.name(), "decoded XML input");
    Ok(text)
}

/// The `encoding="..."` value of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(256)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = head.windows(2).position(|w| w == b"?>")?;
    let declaration = std::str::from_utf8(&head[..end]).ok()?;
    let rest = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    Some(value[..value.find(quote)?].to_string())
}

/// The text is already decoded, so the declaration's encoding no longer
/// applies and is dropped before parsing.
fn without_declaration(text: &str) -> &str {
    if text.starts_with("<?xml") {
        if let Some(end) = text.find("?>") {
            return &text[end + 2..];
        }
    }
    text
}

impl InputReader for XmlAdapter {
    fn format(&self) -> InputFormat {
        InputFormat::Xml
    }

    fn read(&self, bytes: &[u8]) -> Result<RawInput, PerfscopeError> {
        let text = decode(bytes)?;
        let doc = Document::parse(without_declaration(&text))
            .map_err(|e| PerfscopeError::format(format!("XML parse error: {}", e)))?;

        let root = doc.root_element();
        let dialect = XmlDialect::detect(root.tag_name().name());
        let records = dialect.extract(root);
        info!(%dialect, records = records.len(), "extracted XML trade records");

        if records.is_empty() {
            return Err(PerfscopeError::empty(format!(
                "no trade records found in XML ({} dialect)",
                dialect
            )));
        }

        Ok(RawInput {
            format: InputFormat::Xml,
            frame: records_to_frame(&records),
            trades: Some(records),
            detail: format!("dialect {}", dialect),
        })
    }
}
