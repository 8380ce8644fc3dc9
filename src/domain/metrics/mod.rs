//! Metrics engine.
//!
//! [`MetricsBundle::compute`] never fails: every key in [`keys::ALL`] is
//! present afterwards, falling back to its default on empty or short input.

pub mod extended;
pub mod periodic;
pub mod stats;
pub mod synthetic;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::config::MetricsConfig;
use crate::domain::returns::ReturnSeries;
use crate::domain::trade::TradeRecord;

use extended::ExtendedMetrics;
use periodic::PeriodicMetrics;
use stats::{rr_ratio, StandardStats};
use synthetic::MonthlyStats;

pub mod keys {
    pub const CAGR: &str = "CAGR";
    pub const SHARPE: &str = "Sharpe";
    pub const SORTINO: &str = "Sortino";
    pub const CALMAR: &str = "Calmar";
    pub const MAX_DRAWDOWN: &str = "Max_Drawdown";
    pub const VOLATILITY: &str = "Volatility";
    pub const VAR: &str = "VaR";
    pub const CVAR: &str = "CVaR";
    pub const WIN_RATE: &str = "Win_Rate";
    pub const PROFIT_FACTOR: &str = "Profit_Factor";
    pub const OMEGA_RATIO: &str = "Omega_Ratio";
    pub const RECOVERY_FACTOR: &str = "Recovery_Factor";
    pub const SKEWNESS: &str = "Skewness";
    pub const KURTOSIS: &str = "Kurtosis";
    pub const RR_RATIO_AVG: &str = "RR_Ratio_Avg";

    pub const START_PERIOD: &str = "start_period";
    pub const END_PERIOD: &str = "end_period";
    pub const TRADING_PERIOD_YEARS: &str = "trading_period_years";
    pub const AVG_HOLDING_DAYS: &str = "avg_holding_days";
    pub const AVG_HOLDING_HOURS: &str = "avg_holding_hours";
    pub const AVG_HOLDING_MINUTES: &str = "avg_holding_minutes";
    pub const AVG_HOLDING_SECONDS: &str = "avg_holding_seconds";
    pub const HOLDING_DISPLAY: &str = "holding_display";
    pub const LOG_RETURN: &str = "log_return";
    pub const ABSOLUTE_RETURN: &str = "absolute_return";
    pub const ALPHA: &str = "alpha";
    pub const NUMBER_OF_TRADES: &str = "number_of_trades";
    pub const EXPECTED_DAILY_RETURN: &str = "expected_daily_return";
    pub const EXPECTED_MONTHLY_RETURN: &str = "expected_monthly_return";
    pub const EXPECTED_YEARLY_RETURN: &str = "expected_yearly_return";
    pub const DAILY_VAR: &str = "daily_var";
    pub const RISK_OF_RUIN: &str = "risk_of_ruin";
    pub const MAX_WINNING_STREAK: &str = "max_winning_streak";
    pub const MAX_LOSING_STREAK: &str = "max_losing_streak";
    pub const DAILY_WIN_RATE: &str = "daily_win_rate";
    pub const MONTHLY_WIN_RATE: &str = "monthly_win_rate";
    pub const QUARTERLY_WIN_RATE: &str = "quarterly_win_rate";
    pub const YEARLY_WIN_RATE: &str = "yearly_win_rate";
    pub const TOTAL_COMMISSION: &str = "total_commission";
    pub const TOTAL_SWAP: &str = "total_swap";
    pub const TOTAL_TRANSACTION_COSTS: &str = "total_transaction_costs";
    pub const WORST_TRADE: &str = "worst_trade";
    pub const WORST_MONTH: &str = "worst_month";
    pub const WORST_YEAR: &str = "worst_year";
    pub const AVG_WINNING_TRADE: &str = "avg_winning_trade";
    pub const AVG_LOSING_TRADE: &str = "avg_losing_trade";
    pub const AVG_WINNING_MONTH: &str = "avg_winning_month";
    pub const AVG_LOSING_MONTH: &str = "avg_losing_month";
    pub const PROB_NEXT_MONTH_PROFITABLE: &str = "prob_next_month_profitable";
    pub const PROB_NEXT_YEAR_PROFITABLE: &str = "prob_next_year_profitable";
    pub const PROB_MOMENTUM_POSITIVE: &str = "prob_momentum_positive";
    pub const PROB_NEXT_MONTH_SEASONAL: &str = "prob_next_month_seasonal";
    pub const MONTHLY_VOLATILITY: &str = "monthly_volatility";
    pub const MONTHLY_SKEW: &str = "monthly_skew";
    pub const MONTHLY_KURTOSIS: &str = "monthly_kurtosis";
    pub const MONTHLY_STATS_SOURCE: &str = "monthly_stats_source";

    pub const ALL: [&str; 56] = [
        CAGR,
        SHARPE,
        SORTINO,
        CALMAR,
        MAX_DRAWDOWN,
        VOLATILITY,
        VAR,
        CVAR,
        WIN_RATE,
        PROFIT_FACTOR,
        OMEGA_RATIO,
        RECOVERY_FACTOR,
        SKEWNESS,
        KURTOSIS,
        RR_RATIO_AVG,
        START_PERIOD,
        END_PERIOD,
        TRADING_PERIOD_YEARS,
        AVG_HOLDING_DAYS,
        AVG_HOLDING_HOURS,
        AVG_HOLDING_MINUTES,
        AVG_HOLDING_SECONDS,
        HOLDING_DISPLAY,
        LOG_RETURN,
        ABSOLUTE_RETURN,
        ALPHA,
        NUMBER_OF_TRADES,
        EXPECTED_DAILY_RETURN,
        EXPECTED_MONTHLY_RETURN,
        EXPECTED_YEARLY_RETURN,
        DAILY_VAR,
        RISK_OF_RUIN,
        MAX_WINNING_STREAK,
        MAX_LOSING_STREAK,
        DAILY_WIN_RATE,
        MONTHLY_WIN_RATE,
        QUARTERLY_WIN_RATE,
        YEARLY_WIN_RATE,
        TOTAL_COMMISSION,
        TOTAL_SWAP,
        TOTAL_TRANSACTION_COSTS,
        WORST_TRADE,
        WORST_MONTH,
        WORST_YEAR,
        AVG_WINNING_TRADE,
        AVG_LOSING_TRADE,
        AVG_WINNING_MONTH,
        AVG_LOSING_MONTH,
        PROB_NEXT_MONTH_PROFITABLE,
        PROB_NEXT_YEAR_PROFITABLE,
        PROB_MOMENTUM_POSITIVE,
        PROB_NEXT_MONTH_SEASONAL,
        MONTHLY_VOLATILITY,
        MONTHLY_SKEW,
        MONTHLY_KURTOSIS,
        MONTHLY_STATS_SOURCE,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Integer(i64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{:.4}", v),
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MetricsBundle {
    values: BTreeMap<&'static str, MetricValue>,
}

impl MetricsBundle {
    /// `capital_base` scales trade-level profits into fractions and is only
    /// meaningful together with `trades`.
    pub fn compute(
        series: &ReturnSeries,
        trades: Option<&[TradeRecord]>,
        capital_base: Option<f64>,
        config: &MetricsConfig,
    ) -> Self {
        let returns = series.values();
        let timestamps: Vec<_> = series.points().iter().map(|p| p.timestamp).collect();

        let standard = StandardStats::compute(&returns, &timestamps, config.periods_per_year);
        let rr = match trades {
            Some(t) => rr_ratio(&t.iter().map(|r| r.profit).collect::<Vec<_>>()),
            None => rr_ratio(&returns),
        };
        let ext = ExtendedMetrics::compute(series, trades, capital_base);
        let per = PeriodicMetrics::compute(series.points(), trades);
        let monthly = MonthlyStats::compute(
            series.points(),
            config.synthetic_fallback,
            config.synthetic_seed,
        );

        let mut bundle = Self::default();
        bundle.insert(keys::CAGR, standard.cagr);
        bundle.insert(keys::SHARPE, standard.sharpe);
        bundle.insert(keys::SORTINO, standard.sortino);
        bundle.insert(keys::CALMAR, standard.calmar);
        bundle.insert(keys::MAX_DRAWDOWN, standard.max_drawdown);
        bundle.insert(keys::VOLATILITY, standard.volatility);
        bundle.insert(keys::VAR, standard.var);
        bundle.insert(keys::CVAR, standard.cvar);
        bundle.insert(keys::WIN_RATE, standard.win_rate);
        bundle.insert(keys::PROFIT_FACTOR, standard.profit_factor);
        bundle.insert(keys::OMEGA_RATIO, standard.omega);
        bundle.insert(keys::RECOVERY_FACTOR, standard.recovery_factor);
        bundle.insert(keys::SKEWNESS, standard.skewness);
        bundle.insert(keys::KURTOSIS, standard.kurtosis);
        bundle.insert(keys::RR_RATIO_AVG, rr);

        bundle.insert(keys::START_PERIOD, ext.start_period);
        bundle.insert(keys::END_PERIOD, ext.end_period);
        bundle.insert(keys::TRADING_PERIOD_YEARS, ext.trading_period_years);
        bundle.insert(keys::AVG_HOLDING_DAYS, ext.holding.days);
        bundle.insert(keys::AVG_HOLDING_HOURS, ext.holding.hours);
        bundle.insert(keys::AVG_HOLDING_MINUTES, ext.holding.minutes);
        bundle.insert(keys::AVG_HOLDING_SECONDS, ext.holding.seconds);
        bundle.insert(keys::HOLDING_DISPLAY, ext.holding.display);
        bundle.insert(keys::LOG_RETURN, ext.log_return);
        bundle.insert(keys::ABSOLUTE_RETURN, ext.absolute_return);
        bundle.insert(keys::ALPHA, ext.alpha);
        bundle.insert(keys::NUMBER_OF_TRADES, ext.number_of_trades);
        bundle.insert(keys::EXPECTED_DAILY_RETURN, ext.expected_daily_return);
        bundle.insert(keys::EXPECTED_MONTHLY_RETURN, ext.expected_monthly_return);
        bundle.insert(keys::EXPECTED_YEARLY_RETURN, ext.expected_yearly_return);
        bundle.insert(keys::DAILY_VAR, ext.daily_var);
        bundle.insert(keys::RISK_OF_RUIN, ext.risk_of_ruin);
        bundle.insert(keys::MAX_WINNING_STREAK, ext.max_winning_streak);
        bundle.insert(keys::MAX_LOSING_STREAK, ext.max_losing_streak);
        bundle.insert(keys::TOTAL_COMMISSION, ext.total_commission);
        bundle.insert(keys::TOTAL_SWAP, ext.total_swap);
        bundle.insert(keys::TOTAL_TRANSACTION_COSTS, ext.total_transaction_costs);
        bundle.insert(keys::WORST_TRADE, ext.worst_trade);
        bundle.insert(keys::WORST_MONTH, ext.worst_month);
        bundle.insert(keys::WORST_YEAR, ext.worst_year);
        bundle.insert(keys::AVG_WINNING_TRADE, ext.avg_winning_trade);
        bundle.insert(keys::AVG_LOSING_TRADE, ext.avg_losing_trade);
        bundle.insert(keys::AVG_WINNING_MONTH, ext.avg_winning_month);
        bundle.insert(keys::AVG_LOSING_MONTH, ext.avg_losing_month);

        bundle.insert(keys::DAILY_WIN_RATE, per.daily_win_rate);
        bundle.insert(keys::MONTHLY_WIN_RATE, per.monthly_win_rate);
        bundle.insert(keys::QUARTERLY_WIN_RATE, per.quarterly_win_rate);
        bundle.insert(keys::YEARLY_WIN_RATE, per.yearly_win_rate);
        bundle.insert(keys::PROB_NEXT_MONTH_PROFITABLE, per.prob_next_month_profitable);
        bundle.insert(keys::PROB_NEXT_YEAR_PROFITABLE, per.prob_next_year_profitable);
        bundle.insert(keys::PROB_MOMENTUM_POSITIVE, per.prob_momentum_positive);
        bundle.insert(keys::PROB_NEXT_MONTH_SEASONAL, per.prob_next_month_seasonal);

        bundle.insert(keys::MONTHLY_VOLATILITY, monthly.volatility);
        bundle.insert(keys::MONTHLY_SKEW, monthly.skew);
        bundle.insert(keys::MONTHLY_KURTOSIS, monthly.kurtosis);
        bundle.insert(keys::MONTHLY_STATS_SOURCE, monthly.source.to_string());

        bundle
    }

    fn insert(&mut self, key: &'static str, value: impl Into<MetricValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(key)
    }

    /// Numeric value of `key`; `None` for text metrics and unknown keys.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetricValue::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetricValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
