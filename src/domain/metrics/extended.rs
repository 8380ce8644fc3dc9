//! Extended metrics: period span, holding time, streaks, costs and
//! trade-level extremes.

use chrono::Duration;

use super::stats::{mean, quantile, std_dev};
use crate::domain::returns::ReturnSeries;
use crate::domain::trade::TradeRecord;

/// Worst trade scaled to a month when trade records exist.
pub const TRADE_WORST_MONTH_FACTOR: f64 = 5.0;
/// Worst trade scaled to a year when trade records exist.
pub const TRADE_WORST_YEAR_FACTOR: f64 = 20.0;
/// Average trade scaled to a month when trade records exist.
pub const TRADE_AVG_MONTH_FACTOR: f64 = 10.0;
/// Worst period return scaled to a month without trade records.
pub const SERIES_WORST_MONTH_FACTOR: f64 = 30.0;
/// Worst period return scaled to a year without trade records.
pub const SERIES_WORST_YEAR_FACTOR: f64 = 365.0;
/// Average period return scaled to a month without trade records.
pub const SERIES_AVG_MONTH_FACTOR: f64 = 30.0;

const DAYS_PER_YEAR: f64 = 365.25;
const NO_PERIOD: &str = "n/a";

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingPeriod {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub display: String,
}

impl HoldingPeriod {
    /// Breaks an average holding time into the coarsest unit that applies.
    pub fn from_duration(avg: Duration) -> Self {
        let total = avg.num_seconds().max(0);
        if total < 60 {
            Self {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: total,
                display: format!("{} seconds", total),
            }
        } else if total < 3600 {
            Self {
                days: 0,
                hours: 0,
                minutes: total / 60,
                seconds: total % 60,
                display: format!("{} minutes", total / 60),
            }
        } else {
            let days = total / 86_400;
            let hours = (total % 86_400) / 3600;
            let minutes = (total % 3600) / 60;
            Self {
                days,
                hours,
                minutes,
                seconds: total % 60,
                display: format!("{} days {:02}:{:02}", days, hours, minutes),
            }
        }
    }

    fn zero() -> Self {
        Self::from_duration(Duration::zero())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedMetrics {
    pub start_period: String,
    pub end_period: String,
    pub trading_period_years: f64,
    pub holding: HoldingPeriod,
    pub log_return: f64,
    pub absolute_return: f64,
    pub alpha: f64,
    pub number_of_trades: usize,
    pub expected_daily_return: f64,
    pub expected_monthly_return: f64,
    pub expected_yearly_return: f64,
    pub daily_var: f64,
    pub risk_of_ruin: f64,
    pub max_winning_streak: usize,
    pub max_losing_streak: usize,
    pub total_commission: f64,
    pub total_swap: f64,
    pub total_transaction_costs: f64,
    pub worst_trade: f64,
    pub worst_month: f64,
    pub worst_year: f64,
    pub avg_winning_trade: f64,
    pub avg_losing_trade: f64,
    pub avg_winning_month: f64,
    pub avg_losing_month: f64,
}

impl ExtendedMetrics {
    /// `capital_base` converts trade profits into fractions; without it
    /// trade-level figures fall back to the return series.
    pub fn compute(
        series: &ReturnSeries,
        trades: Option<&[TradeRecord]>,
        capital_base: Option<f64>,
    ) -> Self {
        let returns = series.values();

        let (start_period, end_period, trading_period_years) =
            match (series.first_timestamp(), series.last_timestamp()) {
                (Some(first), Some(last)) => (
                    first.format("%Y-%m-%d").to_string(),
                    last.format("%Y-%m-%d").to_string(),
                    (last - first).num_days() as f64 / DAYS_PER_YEAR,
                ),
                _ => (NO_PERIOD.to_string(), NO_PERIOD.to_string(), 0.0),
            };

        let log_return = returns.iter().map(|r| (1.0 + r).ln()).sum::<f64>();
        let absolute_return: f64 = returns.iter().sum();
        let mu = mean(&returns);
        let (max_winning_streak, max_losing_streak) = max_streaks(&returns);

        let (total_commission, total_swap) = trades
            .map(|t| {
                (
                    t.iter().map(|r| r.commission).sum(),
                    t.iter().map(|r| r.swap).sum(),
                )
            })
            .unwrap_or((0.0, 0.0));

        let extremes = match (trades, capital_base) {
            (Some(t), Some(capital)) if !t.is_empty() && capital > 0.0 => {
                let scaled: Vec<f64> = t.iter().map(|r| r.profit / capital).collect();
                Extremes::from_values(
                    &scaled,
                    TRADE_WORST_MONTH_FACTOR,
                    TRADE_WORST_YEAR_FACTOR,
                    TRADE_AVG_MONTH_FACTOR,
                )
            }
            _ => Extremes::from_values(
                &returns,
                SERIES_WORST_MONTH_FACTOR,
                SERIES_WORST_YEAR_FACTOR,
                SERIES_AVG_MONTH_FACTOR,
            ),
        };

        Self {
            start_period,
            end_period,
            trading_period_years,
            holding: trades.map(average_holding).unwrap_or_else(HoldingPeriod::zero),
            log_return: if log_return.is_finite() { log_return } else { 0.0 },
            absolute_return,
            alpha: absolute_return,
            number_of_trades: trades.map_or(returns.len(), <[TradeRecord]>::len),
            expected_daily_return: mu,
            expected_monthly_return: mu * 30.0,
            expected_yearly_return: mu * 365.0,
            daily_var: quantile(&returns, 0.05),
            risk_of_ruin: risk_of_ruin(&returns),
            max_winning_streak,
            max_losing_streak,
            total_commission,
            total_swap,
            total_transaction_costs: total_commission + total_swap,
            worst_trade: extremes.worst,
            worst_month: extremes.worst_month,
            worst_year: extremes.worst_year,
            avg_winning_trade: extremes.avg_win,
            avg_losing_trade: extremes.avg_loss,
            avg_winning_month: extremes.avg_win_month,
            avg_losing_month: extremes.avg_loss_month,
        }
    }
}

/// Worst/average figures with their fixed month/year approximations.
struct Extremes {
    worst: f64,
    worst_month: f64,
    worst_year: f64,
    avg_win: f64,
    avg_loss: f64,
    avg_win_month: f64,
    avg_loss_month: f64,
}

impl Extremes {
    fn from_values(values: &[f64], worst_month: f64, worst_year: f64, avg_month: f64) -> Self {
        let worst = values.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let wins: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
        let losses: Vec<f64> = values.iter().copied().filter(|v| *v < 0.0).collect();
        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);
        Self {
            worst,
            worst_month: worst * worst_month,
            worst_year: worst * worst_year,
            avg_win,
            avg_loss,
            avg_win_month: avg_win * avg_month,
            avg_loss_month: avg_loss * avg_month,
        }
    }
}

/// Longest runs of positive and non-positive returns.
pub fn max_streaks(returns: &[f64]) -> (usize, usize) {
    let mut best_win = 0;
    let mut best_loss = 0;
    let mut run = 0;
    let mut current: Option<bool> = None;

    for r in returns {
        let winning = *r > 0.0;
        if current == Some(winning) {
            run += 1;
        } else {
            current = Some(winning);
            run = 1;
        }
        if winning {
            best_win = best_win.max(run);
        } else {
            best_loss = best_loss.max(run);
        }
    }
    (best_win, best_loss)
}

/// `max(0, 1 - (1 + mean/std)^n)`; 0 for flat or degenerate input.
pub fn risk_of_ruin(returns: &[f64]) -> f64 {
    let sd = std_dev(returns);
    if sd <= 0.0 {
        return 0.0;
    }
    ruin_from_edge(mean(returns) / sd, returns.len())
}

/// `1 - (1 + edge)^periods`, clamped to zero and zeroed when not finite.
fn ruin_from_edge(edge: f64, periods: usize) -> f64 {
    let value = 1.0 - (1.0 + edge).powf(periods as f64);
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn average_holding(trades: &[TradeRecord]) -> HoldingPeriod {
    let periods: Vec<Duration> = trades.iter().filter_map(TradeRecord::holding_period).collect();
    if periods.is_empty() {
        return HoldingPeriod::zero();
    }
    let total: i64 = periods.iter().map(Duration::num_seconds).sum();
    HoldingPeriod::from_duration(Duration::seconds(total / periods.len() as i64))
}
