//! Canonical trade records.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::datetime::parse_cell_datetime;
use super::frame::{Cell, RawFrame};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub ticket: String,
    pub side: String,
    pub volume: f64,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
    pub commission: f64,
    pub swap: f64,
    pub time_open: Option<NaiveDateTime>,
    pub time_close: Option<NaiveDateTime>,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    pub fn holding_period(&self) -> Option<chrono::Duration> {
        match (self.time_open, self.time_close) {
            (Some(open), Some(close)) if close >= open => Some(close - open),
            _ => None,
        }
    }
}

/// Canonical field a source column or attribute maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeField {
    Symbol,
    Ticket,
    Side,
    Volume,
    OpenPrice,
    ClosePrice,
    Profit,
    Commission,
    Swap,
    TimeOpen,
    TimeClose,
}

impl TradeField {
    /// Map a lowercased key from the broad synonym set.
    pub fn from_synonym(key: &str) -> Option<Self> {
        let field = match key {
            "profit" | "pnl" | "pl" | "netprofit" => TradeField::Profit,
            "commission" | "comm" => TradeField::Commission,
            "swap" | "rollover" => TradeField::Swap,
            "symbol" | "instrument" => TradeField::Symbol,
            "volume" | "size" | "lots" => TradeField::Volume,
            "openprice" | "entryprice" => TradeField::OpenPrice,
            "closeprice" | "exitprice" => TradeField::ClosePrice,
            "opentime" | "entrytime" | "timeopen" => TradeField::TimeOpen,
            "closetime" | "exittime" | "timeclose" => TradeField::TimeClose,
            _ => return None,
        };
        Some(field)
    }

    /// Like [`TradeField::from_synonym`], but also accepts spreadsheet-style
    /// headers ("Open Price", "time_close", "Ticket", "Type").
    pub fn from_column_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "ticket" | "positionid" | "order" | "deal" => Some(TradeField::Ticket),
            "type" | "side" | "tradeside" | "direction" => Some(TradeField::Side),
            // A lone "time" column is when the trade was booked, i.e. closed.
            "time" => Some(TradeField::TimeClose),
            "price" => Some(TradeField::OpenPrice),
            other => Self::from_synonym(other),
        }
    }
}

/// Extract best-effort trade records from a trades-mode frame.
///
/// `profit_index` is the column chosen by the profit locator; other fields
/// are matched by name. Rows whose profit cannot be read are skipped.
pub fn trades_from_frame(frame: &RawFrame, profit_index: usize) -> Vec<TradeRecord> {
    let mut mapping: Vec<(usize, TradeField)> = Vec::new();
    for (i, name) in frame.columns.iter().enumerate() {
        if i == profit_index {
            continue;
        }
        if let Some(field) = TradeField::from_column_name(name) {
            if field != TradeField::Profit && !mapping.iter().any(|(_, f)| *f == field) {
                mapping.push((i, field));
            }
        }
    }

    frame
        .rows
        .iter()
        .filter_map(|row| {
            let profit = row[profit_index].to_number()?;
            let mut record = TradeRecord {
                profit,
                ..TradeRecord::default()
            };
            for &(i, field) in &mapping {
                apply_cell(&mut record, field, &row[i]);
            }
            Some(record)
        })
        .collect()
}

fn apply_cell(record: &mut TradeRecord, field: TradeField, cell: &Cell) {
    let number = || cell.to_number().unwrap_or(0.0);
    match field {
        TradeField::Symbol => record.symbol = cell.as_text(),
        TradeField::Ticket => record.ticket = cell.as_text(),
        TradeField::Side => record.side = cell.as_text(),
        TradeField::Volume => record.volume = number(),
        TradeField::OpenPrice => record.open_price = number(),
        TradeField::ClosePrice => record.close_price = number(),
        TradeField::Profit => record.profit = number(),
        TradeField::Commission => record.commission = number(),
        TradeField::Swap => record.swap = number(),
        TradeField::TimeOpen => record.time_open = parse_cell_datetime(cell),
        TradeField::TimeClose => record.time_close = parse_cell_datetime(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn synonyms_map_to_fields() {
        assert_eq!(TradeField::from_synonym("pnl"), Some(TradeField::Profit));
        assert_eq!(TradeField::from_synonym("rollover"), Some(TradeField::Swap));
        assert_eq!(TradeField::from_synonym("lots"), Some(TradeField::Volume));
        assert_eq!(TradeField::from_synonym("exittime"), Some(TradeField::TimeClose));
        assert_eq!(TradeField::from_synonym("comment"), None);
    }

    #[test]
    fn column_names_are_normalized() {
        assert_eq!(
            TradeField::from_column_name("Open Price"),
            Some(TradeField::OpenPrice)
        );
        assert_eq!(
            TradeField::from_column_name("time_close"),
            Some(TradeField::TimeClose)
        );
        assert_eq!(TradeField::from_column_name("Type"), Some(TradeField::Side));
    }

    #[test]
    fn bare_time_column_is_the_close_time() {
        assert_eq!(TradeField::from_column_name("time"), Some(TradeField::TimeClose));
        assert_eq!(TradeField::from_column_name("Time"), Some(TradeField::TimeClose));

        let frame = RawFrame::new(
            vec!["symbol".into(), "time".into(), "profit".into()],
            vec![vec![
                Cell::Text("EURUSD".into()),
                Cell::Text("2024-01-02 12:00:00".into()),
                Cell::Number(10.0),
            ]],
        );
        let trades = trades_from_frame(&frame, 2);
        assert_eq!(trades[0].time_close, Some(ts(2, 12)));
        assert_eq!(trades[0].time_open, None);
    }

    #[test]
    fn holding_period_requires_both_times() {
        let mut trade = TradeRecord {
            time_open: Some(ts(1, 10)),
            time_close: Some(ts(1, 12)),
            ..TradeRecord::default()
        };
        assert_eq!(trade.holding_period(), Some(chrono::Duration::hours(2)));
        trade.time_open = None;
        assert_eq!(trade.holding_period(), None);
    }

    #[test]
    fn frame_rows_become_records() {
        let frame = RawFrame::new(
            vec![
                "Symbol".into(),
                "Profit".into(),
                "Commission".into(),
                "Close Time".into(),
            ],
            vec![
                vec![
                    Cell::Text("EURUSD".into()),
                    Cell::Number(25.0),
                    Cell::Number(-1.5),
                    Cell::Text("2024-01-02 12:00:00".into()),
                ],
                vec![
                    Cell::Text("EURUSD".into()),
                    Cell::Text("n/a".into()),
                    Cell::Empty,
                    Cell::Empty,
                ],
                vec![
                    Cell::Text("GBPUSD".into()),
                    Cell::Number(-10.0),
                    Cell::Text("oops".into()),
                    Cell::Empty,
                ],
            ],
        );
        let trades = trades_from_frame(&frame, 1);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].symbol, "EURUSD");
        assert_eq!(trades[0].commission, -1.5);
        assert_eq!(trades[0].time_close, Some(ts(2, 12)));
        assert_eq!(trades[1].profit, -10.0);
        assert_eq!(trades[1].commission, 0.0);
        assert_eq!(trades[1].time_close, None);
    }
}
