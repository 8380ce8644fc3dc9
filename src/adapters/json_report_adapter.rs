//! JSON report output.
//!
//! One document per session: load provenance, the metrics bundle as a flat
//! object, then the return series, equity curve and trade records.

use std::fs;

use serde::Serialize;
use tracing::info;

use crate::domain::error::PerfscopeError;
use crate::domain::metrics::MetricsBundle;
use crate::domain::returns::{DataMode, EquityPoint, ReturnPoint};
use crate::domain::session::SessionResult;
use crate::domain::trade::TradeRecord;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub format: String,
    pub mode: DataMode,
    pub detail: &'a str,
    pub columns: &'a [String],
    pub capital_base: Option<f64>,
    pub profit_column: Option<&'a str>,
    pub metrics: &'a MetricsBundle,
    pub returns: &'a [ReturnPoint],
    pub equity: &'a [EquityPoint],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trades: Option<&'a [TradeRecord]>,
}

impl<'a> Report<'a> {
    pub fn new(session: &'a SessionResult, metrics: &'a MetricsBundle) -> Self {
        Self {
            format: session.format.to_string(),
            mode: session.mode,
            detail: &session.detail,
            columns: &session.columns,
            capital_base: session.capital_base,
            profit_column: session.profit_column.as_deref(),
            metrics,
            returns: session.returns.points(),
            equity: session.equity.points(),
            trades: session.trades.as_deref(),
        }
    }
}

pub fn render(session: &SessionResult, metrics: &MetricsBundle) -> Result<String, PerfscopeError> {
    serde_json::to_string_pretty(&Report::new(session, metrics))
        .map_err(|e| PerfscopeError::format(format!("cannot serialize report: {}", e)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        session: &SessionResult,
        metrics: &MetricsBundle,
        output_path: &str,
    ) -> Result<(), PerfscopeError> {
        let body = render(session, metrics)?;
        fs::write(output_path, body)?;
        info!(path = output_path, "wrote JSON report");
        Ok(())
    }
}
