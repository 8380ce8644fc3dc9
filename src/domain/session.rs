//! Immutable result of one ingestion run.

use tracing::info;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::PerfscopeError;
use crate::domain::input::{InputFormat, RawInput};
use crate::domain::metrics::MetricsBundle;
use crate::domain::returns::{
    build_from_equity, build_from_returns, build_from_trades, DataMode, EquityCurve, ReturnSeries,
};
use crate::domain::trade::TradeRecord;

/// Everything a load produced. Built whole by [`SessionResult::from_input`]
/// and never mutated; a new load replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub format: InputFormat,
    pub mode: DataMode,
    pub detail: String,
    pub columns: Vec<String>,
    pub returns: ReturnSeries,
    pub equity: EquityCurve,
    pub trades: Option<Vec<TradeRecord>>,
    pub capital_base: Option<f64>,
    pub profit_column: Option<String>,
}

impl SessionResult {
    pub fn from_input(input: RawInput, config: &AnalysisConfig) -> Result<Self, PerfscopeError> {
        let mode = resolve_mode(input.format, config.mode);
        let RawInput {
            format,
            frame,
            trades,
            detail,
        } = input;

        let build = match mode {
            DataMode::Returns => build_from_returns(&frame)?,
            DataMode::Equity => build_from_equity(&frame)?,
            DataMode::Trades => build_from_trades(&frame, trades, config.initial_capital)?,
        };

        info!(
            %format,
            %mode,
            points = build.returns.len(),
            "session built"
        );

        Ok(Self {
            format,
            mode,
            detail,
            columns: frame.columns,
            returns: build.returns,
            equity: build.equity,
            trades: build.trades,
            capital_base: build.capital_base,
            profit_column: build.profit_column,
        })
    }

    pub fn metrics(&self, config: &AnalysisConfig) -> MetricsBundle {
        MetricsBundle::compute(
            &self.returns,
            self.trades.as_deref(),
            self.capital_base,
            &config.metrics,
        )
    }
}

/// The mode a load actually runs in: spreadsheet and XML input override
/// the requested mode.
pub fn resolve_mode(format: InputFormat, requested: DataMode) -> DataMode {
    match format.forced_mode() {
        Some(forced) if forced != requested => {
            info!(%format, %requested, %forced, "input format overrides requested mode");
            forced
        }
        Some(forced) => forced,
        None => requested,
    }
}
