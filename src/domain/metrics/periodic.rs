//! Calendar-bucket win rates and the predictive-probability heuristics.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};

use crate::domain::returns::ReturnPoint;
use crate::domain::trade::TradeRecord;

/// Trades inspected by the momentum adjustment.
pub const MOMENTUM_WINDOW: usize = 10;
const MOMENTUM_HOT: f64 = 0.6;
const MOMENTUM_COLD: f64 = 0.3;
const MOMENTUM_UP: f64 = 1.3;
const MOMENTUM_DOWN: f64 = 0.7;
const MOMENTUM_CAP: f64 = 0.8;
const MOMENTUM_FLOOR: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Quarter,
    Year,
}

impl Period {
    /// Monotonic bucket index; consecutive buckets differ by one.
    fn key(self, ts: &NaiveDateTime) -> i64 {
        let year = i64::from(ts.year());
        let month0 = i64::from(ts.month0());
        match self {
            Period::Month => year * 12 + month0,
            Period::Quarter => year * 4 + month0 / 3,
            Period::Year => year,
        }
    }
}

/// Summed returns per calendar bucket, covering every bucket from the
/// first to the last observation. Buckets without data sum to 0.
pub fn bucket_sums(points: &[ReturnPoint], period: Period) -> Vec<f64> {
    let mut sums: BTreeMap<i64, f64> = BTreeMap::new();
    for p in points {
        *sums.entry(period.key(&p.timestamp)).or_insert(0.0) += p.value;
    }
    let (Some(first), Some(last)) = (
        sums.keys().next().copied(),
        sums.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };
    (first..=last)
        .map(|k| sums.get(&k).copied().unwrap_or(0.0))
        .collect()
}

fn positive_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| **v > 0.0).count() as f64 / values.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicMetrics {
    pub daily_win_rate: f64,
    pub monthly_win_rate: f64,
    pub quarterly_win_rate: f64,
    pub yearly_win_rate: f64,
    pub prob_next_month_profitable: f64,
    pub prob_next_year_profitable: f64,
    pub prob_momentum_positive: f64,
    pub prob_next_month_seasonal: f64,
}

impl PeriodicMetrics {
    pub fn compute(points: &[ReturnPoint], trades: Option<&[TradeRecord]>) -> Self {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let monthly = positive_fraction(&bucket_sums(points, Period::Month));
        let quarterly = positive_fraction(&bucket_sums(points, Period::Quarter));
        let yearly = positive_fraction(&bucket_sums(points, Period::Year));

        let prob_momentum_positive = match trades {
            Some(t) => momentum_adjusted(monthly, t),
            None => monthly,
        };

        Self {
            daily_win_rate: positive_fraction(&values),
            monthly_win_rate: monthly,
            quarterly_win_rate: quarterly,
            yearly_win_rate: yearly,
            prob_next_month_profitable: monthly,
            prob_next_year_profitable: yearly,
            prob_momentum_positive,
            prob_next_month_seasonal: monthly,
        }
    }
}

/// Scale `base` by the win rate of the most recent trades: above 0.6 it is
/// raised (capped at 0.8), below 0.3 lowered (floored at 0.2). Fewer than
/// ten trades leave it unchanged.
pub fn momentum_adjusted(base: f64, trades: &[TradeRecord]) -> f64 {
    if trades.len() < MOMENTUM_WINDOW {
        return base;
    }
    let recent = &trades[trades.len() - MOMENTUM_WINDOW..];
    let wins = recent.iter().filter(|t| t.is_win()).count();
    let recent_rate = wins as f64 / MOMENTUM_WINDOW as f64;

    if recent_rate > MOMENTUM_HOT {
        (base * MOMENTUM_UP).min(MOMENTUM_CAP)
    } else if recent_rate < MOMENTUM_COLD {
        (base * MOMENTUM_DOWN).max(MOMENTUM_FLOOR)
    } else {
        base
    }
}
