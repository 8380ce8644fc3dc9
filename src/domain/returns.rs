//! Conversion of raw frames into a canonical return series and equity curve.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::datetime::parse_cell_datetime;
use super::error::PerfscopeError;
use super::frame::{Cell, RawFrame};
use super::trade::{trades_from_frame, TradeRecord};

/// Exact-name candidates for the profit column, in priority order.
pub const PROFIT_COLUMN_CANDIDATES: [&str; 17] = [
    "profit",
    "Profit",
    "PnL",
    "pnl",
    "P&L",
    "pl",
    "PL",
    "Net_Profit",
    "NetProfit",
    "net_profit",
    "Gain",
    "gain",
    "Result",
    "result",
    "Resultat",
    "Bénéfice",
    "benefice",
];

/// Close-time column names, matched case-insensitively in order.
const CLOSE_TIME_CANDIDATES: [&str; 8] = [
    "time_close",
    "close_time",
    "closetime",
    "timeclose",
    "exit_time",
    "exittime",
    "close time",
    "time",
];

fn synthetic_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Daily timestamps starting at the fixed synthetic epoch.
pub fn synthetic_timestamps(count: usize) -> Vec<NaiveDateTime> {
    let start = synthetic_epoch();
    (0..count)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Returns,
    Equity,
    Trades,
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataMode::Returns => write!(f, "returns"),
            DataMode::Equity => write!(f, "equity"),
            DataMode::Trades => write!(f, "trades"),
        }
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "returns" => Ok(DataMode::Returns),
            "equity" => Ok(DataMode::Equity),
            "trades" => Ok(DataMode::Trades),
            other => Err(format!(
                "unknown mode '{}' (expected returns, equity or trades)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Time-ordered fractional returns. Values are always finite.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Drops non-finite values and stably sorts by timestamp.
    pub fn new(mut points: Vec<ReturnPoint>) -> Self {
        points.retain(|p| p.value.is_finite());
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Running product of `1 + r`, starting from 1.0.
    pub fn compounded(&self) -> EquityCurve {
        let mut value = 1.0;
        let points = self
            .points
            .iter()
            .map(|p| {
                value *= 1.0 + p.value;
                EquityPoint {
                    timestamp: p.timestamp,
                    value,
                }
            })
            .collect();
        EquityCurve { points }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_value(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// Output of the series builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBuild {
    pub returns: ReturnSeries,
    pub equity: EquityCurve,
    pub trades: Option<Vec<TradeRecord>>,
    pub capital_base: Option<f64>,
    pub profit_column: Option<String>,
}

/// Heuristic capital base from observed profit magnitudes.
///
/// Tiers on the absolute net profit `T` with `M` the largest absolute single
/// profit: `T > 100k → max(100k, 10M)`, `T > 10k → max(50k, 5M)`,
/// otherwise `max(10k, 2M)`.
pub fn estimate_capital(profits: &[f64]) -> f64 {
    let total = profits.iter().sum::<f64>().abs();
    let max_single = profits.iter().fold(0.0_f64, |acc, p| acc.max(p.abs()));

    if total > 100_000.0 {
        f64::max(100_000.0, 10.0 * max_single)
    } else if total > 10_000.0 {
        f64::max(50_000.0, 5.0 * max_single)
    } else {
        f64::max(10_000.0, 2.0 * max_single)
    }
}

/// Locate the profit column: exact candidate names first, then the first
/// numeric column holding both positive and negative values.
pub fn detect_profit_column(frame: &RawFrame) -> Option<usize> {
    for candidate in PROFIT_COLUMN_CANDIDATES {
        if let Some(i) = frame.column_index(candidate) {
            return Some(i);
        }
    }

    (0..frame.width()).find(|&i| {
        if !frame.is_numeric_column(i) {
            return false;
        }
        let values = frame.numeric_values(i);
        values.iter().any(|v| *v > 0.0) && values.iter().any(|v| *v < 0.0)
    })
}

fn index_timestamps(frame: &RawFrame, rows: &[usize]) -> Vec<NaiveDateTime> {
    let parsed: Option<Vec<NaiveDateTime>> = rows
        .iter()
        .map(|&r| parse_cell_datetime(&frame.rows[r][0]))
        .collect();
    match parsed {
        Some(ts) => ts,
        None => {
            warn!("temporal index not parseable, using synthetic daily timestamps");
            synthetic_timestamps(rows.len())
        }
    }
}

/// Rows of the first data column that coerce to a finite number.
fn first_data_column(frame: &RawFrame) -> Result<Vec<(usize, f64)>, PerfscopeError> {
    if frame.width() < 2 {
        return Err(PerfscopeError::empty(
            "table has no data column after the temporal index",
        ));
    }
    Ok(frame
        .rows
        .iter()
        .enumerate()
        .filter_map(|(r, row)| row[1].to_number().map(|v| (r, v)))
        .collect())
}

/// First data column read as already-relative returns.
pub fn build_from_returns(frame: &RawFrame) -> Result<SeriesBuild, PerfscopeError> {
    let values = first_data_column(frame)?;
    if values.is_empty() {
        return Err(PerfscopeError::empty(
            "returns column has no numeric values",
        ));
    }

    let rows: Vec<usize> = values.iter().map(|(r, _)| *r).collect();
    let timestamps = index_timestamps(frame, &rows);
    let returns = ReturnSeries::new(
        timestamps
            .into_iter()
            .zip(values.iter())
            .map(|(timestamp, (_, value))| ReturnPoint {
                timestamp,
                value: *value,
            })
            .collect(),
    );
    let equity = returns.compounded();
    info!(points = returns.len(), "built return series from returns column");

    Ok(SeriesBuild {
        returns,
        equity,
        trades: None,
        capital_base: None,
        profit_column: None,
    })
}

/// First data column read as absolute portfolio value.
pub fn build_from_equity(frame: &RawFrame) -> Result<SeriesBuild, PerfscopeError> {
    let mut values = first_data_column(frame)?;
    let before = values.len();
    values.retain(|(_, v)| *v > 0.0);
    if values.len() < before {
        warn!(dropped = before - values.len(), "dropped non-positive equity values");
    }
    if values.is_empty() {
        return Err(PerfscopeError::empty(
            "equity column has no positive numeric values",
        ));
    }

    let rows: Vec<usize> = values.iter().map(|(r, _)| *r).collect();
    let timestamps = index_timestamps(frame, &rows);
    let mut equity_points: Vec<EquityPoint> = timestamps
        .into_iter()
        .zip(values.iter())
        .map(|(timestamp, (_, value))| EquityPoint {
            timestamp,
            value: *value,
        })
        .collect();
    equity_points.sort_by_key(|p| p.timestamp);

    let returns = ReturnSeries::new(
        equity_points
            .windows(2)
            .map(|w| ReturnPoint {
                timestamp: w[1].timestamp,
                value: w[1].value / w[0].value - 1.0,
            })
            .collect(),
    );
    if returns.is_empty() {
        return Err(PerfscopeError::empty(
            "at least two equity values are needed to derive returns",
        ));
    }
    info!(points = returns.len(), "built return series from equity curve");

    Ok(SeriesBuild {
        returns,
        equity: EquityCurve {
            points: equity_points,
        },
        trades: None,
        capital_base: None,
        profit_column: None,
    })
}

fn close_time_column(frame: &RawFrame) -> Option<usize> {
    CLOSE_TIME_CANDIDATES
        .iter()
        .find_map(|name| frame.column_index_ignore_case(name))
}

/// Per-trade profits converted to returns against a capital base.
///
/// `records` carries already-extracted trades (XML input); otherwise
/// records are derived from the frame.
pub fn build_from_trades(
    frame: &RawFrame,
    records: Option<Vec<TradeRecord>>,
    initial_capital: Option<f64>,
) -> Result<SeriesBuild, PerfscopeError> {
    let profit_index =
        detect_profit_column(frame).ok_or_else(|| PerfscopeError::ColumnNotFound {
            available: frame.columns.clone(),
        })?;
    let profit_column = frame.columns[profit_index].clone();
    debug!(column = %profit_column, "profit column located");

    let mut trades = match records {
        Some(records) => records,
        None => trades_from_frame(frame, profit_index),
    };
    if trades.is_empty() {
        return Err(PerfscopeError::empty(format!(
            "column '{}' has no numeric profit values",
            profit_column
        )));
    }

    // Rows are filtered exactly like the record extraction so both stay aligned.
    let timestamps: Option<Vec<NaiveDateTime>> = close_time_column(frame).and_then(|ci| {
        frame
            .rows
            .iter()
            .filter(|row| row[profit_index].to_number().is_some())
            .map(|row| parse_cell_datetime(&row[ci]))
            .collect()
    });
    let timestamps = match timestamps.filter(|ts| ts.len() == trades.len()) {
        Some(ts) => {
            let mut paired: Vec<(NaiveDateTime, TradeRecord)> =
                ts.into_iter().zip(trades).collect();
            paired.sort_by_key(|(t, _)| *t);
            let (ts, sorted): (Vec<_>, Vec<_>) = paired.into_iter().unzip();
            trades = sorted;
            ts
        }
        None => {
            debug!("no usable close times, using synthetic daily timestamps");
            synthetic_timestamps(trades.len())
        }
    };

    let profits: Vec<f64> = trades.iter().map(|t| t.profit).collect();
    let capital = match initial_capital {
        Some(c) => c,
        None => estimate_capital(&profits),
    };
    info!(
        capital,
        trades = trades.len(),
        estimated = initial_capital.is_none(),
        "capital base resolved"
    );

    let returns = ReturnSeries::new(
        timestamps
            .into_iter()
            .zip(profits.iter())
            .map(|(timestamp, p)| ReturnPoint {
                timestamp,
                value: p / capital,
            })
            .collect(),
    );
    if returns.is_empty() {
        return Err(PerfscopeError::empty("no finite per-trade returns"));
    }
    let equity = returns.compounded();

    Ok(SeriesBuild {
        returns,
        equity,
        trades: Some(trades),
        capital_base: Some(capital),
        profit_column: Some(profit_column),
    })
}

/// Cells of a frame column rendered for diagnostics.
pub fn describe_column(frame: &RawFrame, index: usize) -> String {
    let sample: Vec<String> = frame
        .non_empty_values(index)
        .take(3)
        .map(Cell::as_text)
        .collect();
    format!("{} [{}]", frame.columns[index], sample.join(", "))
}
