//! Standard risk/return statistics over a return series.
//!
//! Conventions: zero risk-free rate, sample standard deviation (ddof = 1),
//! annualization by `periods_per_year`.

use chrono::NaiveDateTime;

/// One-sided 95% quantile of the standard normal distribution.
const Z_95: f64 = 1.644_853_626_951_472_2;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardStats {
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub var: f64,
    pub cvar: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub omega: f64,
    pub recovery_factor: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl StandardStats {
    /// `timestamps` must be parallel to `returns` (used for the CAGR span).
    pub fn compute(returns: &[f64], timestamps: &[NaiveDateTime], periods_per_year: f64) -> Self {
        let n = returns.len();
        if n == 0 {
            return Self::empty();
        }

        let mu = mean(returns);
        let sd = std_dev(returns);
        let max_drawdown = max_drawdown(returns);
        let cagr = cagr(returns, timestamps, periods_per_year);

        let sharpe = if sd > 0.0 {
            mu / sd * periods_per_year.sqrt()
        } else {
            0.0
        };

        let downside = (returns
            .iter()
            .filter(|r| **r < 0.0)
            .map(|r| r * r)
            .sum::<f64>()
            / n as f64)
            .sqrt();
        let sortino = if downside > 0.0 {
            mu / downside * periods_per_year.sqrt()
        } else {
            0.0
        };

        let calmar = if max_drawdown < 0.0 {
            cagr / max_drawdown.abs()
        } else {
            0.0
        };

        let var = mu - Z_95 * sd;
        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r < var).collect();
        let cvar = if tail.is_empty() { var } else { mean(&tail) };

        let non_zero = returns.iter().filter(|r| **r != 0.0).count();
        let wins = returns.iter().filter(|r| **r > 0.0).count();
        let win_rate = if non_zero > 0 {
            wins as f64 / non_zero as f64
        } else {
            0.0
        };

        let gains: f64 = returns.iter().filter(|r| **r >= 0.0).sum();
        let losses: f64 = returns.iter().filter(|r| **r < 0.0).sum::<f64>().abs();
        let profit_factor = if losses > 0.0 {
            gains / losses
        } else if gains > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        let omega = if losses > 0.0 {
            returns.iter().filter(|r| **r > 0.0).sum::<f64>() / losses
        } else {
            0.0
        };

        let recovery_factor = if max_drawdown < 0.0 {
            returns.iter().sum::<f64>().abs() / max_drawdown.abs()
        } else {
            0.0
        };

        Self {
            cagr,
            sharpe,
            sortino,
            calmar,
            max_drawdown,
            volatility: sd * periods_per_year.sqrt(),
            var,
            cvar,
            win_rate,
            profit_factor,
            omega,
            recovery_factor,
            skewness: skewness(returns),
            kurtosis: kurtosis(returns),
        }
    }

    fn empty() -> Self {
        Self {
            cagr: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            calmar: 0.0,
            max_drawdown: 0.0,
            volatility: 0.0,
            var: 0.0,
            cvar: 0.0,
            win_rate: 0.0,
            profit_factor: 0.0,
            omega: 0.0,
            recovery_factor: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let ss: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

fn central_sums(values: &[f64]) -> (f64, f64, f64) {
    let mu = mean(values);
    values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), v| {
        let d = v - mu;
        (m2 + d * d, m3 + d * d * d, m4 + d * d * d * d)
    })
}

/// Bias-corrected sample skewness; 0 below three values or for flat data.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return 0.0;
    }
    let (s2, s3, _) = central_sums(values);
    let m2 = s2 / n;
    if m2 <= f64::EPSILON * f64::EPSILON {
        return 0.0;
    }
    let m3 = s3 / n;
    (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
}

/// Bias-corrected excess kurtosis; 0 below four values or for flat data.
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return 0.0;
    }
    let (s2, _, s4) = central_sums(values);
    if s2 <= f64::EPSILON * f64::EPSILON {
        return 0.0;
    }
    let a = (n + 1.0) * n * (n - 1.0) / ((n - 2.0) * (n - 3.0)) * s4 / (s2 * s2);
    let b = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    a - b
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Worst peak-to-trough decline of the compounded curve, as a negative
/// fraction. The curve starts at 1.0 so an opening loss counts.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;
    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = equity / peak - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

fn cagr(returns: &[f64], timestamps: &[NaiveDateTime], periods_per_year: f64) -> f64 {
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    if growth <= 0.0 {
        return -1.0;
    }

    let span_years = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => (*last - *first).num_days() as f64 / DAYS_PER_YEAR,
        _ => 0.0,
    };
    let years = if span_years > 0.0 {
        span_years
    } else {
        returns.len() as f64 / periods_per_year
    };
    if years <= 0.0 {
        return 0.0;
    }

    let value = growth.powf(1.0 / years) - 1.0;
    if value.is_finite() { value } else { 0.0 }
}

/// Mean win over mean absolute loss; 0 when either side is missing.
pub fn rr_ratio(amounts: &[f64]) -> f64 {
    let wins: Vec<f64> = amounts.iter().copied().filter(|a| *a > 0.0).collect();
    let losses: Vec<f64> = amounts
        .iter()
        .copied()
        .filter(|a| *a < 0.0)
        .map(f64::abs)
        .collect();
    if wins.is_empty() || losses.is_empty() {
        return 0.0;
    }
    mean(&wins) / mean(&losses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn daily(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn rr_ratio_example() {
        assert_relative_eq!(rr_ratio(&[100.0, 200.0, -50.0, -150.0]), 1.5);
    }

    #[test]
    fn rr_ratio_one_sided_is_zero() {
        assert_eq!(rr_ratio(&[1.0, 2.0]), 0.0);
        assert_eq!(rr_ratio(&[-1.0]), 0.0);
        assert_eq!(rr_ratio(&[]), 0.0);
    }

    #[test]
    fn empty_series_defaults() {
        let stats = StandardStats::compute(&[], &[], 252.0);
        assert_eq!(stats, StandardStats::empty());
    }

    #[test]
    fn sharpe_and_volatility() {
        let r = [0.01, -0.005, 0.02, 0.0, 0.015];
        let stats = StandardStats::compute(&r, &daily(r.len()), 252.0);
        let mu = 0.008;
        let sd = std_dev(&r);
        assert_relative_eq!(stats.sharpe, mu / sd * 252f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(stats.volatility, sd * 252f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sortino_uses_downside_over_all_points() {
        let r = [0.02, -0.01, 0.03, -0.02];
        let stats = StandardStats::compute(&r, &daily(4), 252.0);
        let downside = ((0.0001 + 0.0004) / 4.0_f64).sqrt();
        assert_relative_eq!(stats.sortino, 0.005 / downside * 252f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn drawdown_is_negative_fraction() {
        // 1.0 -> 1.1 -> 0.88 -> 0.968
        let dd = max_drawdown(&[0.1, -0.2, 0.1]);
        assert_relative_eq!(dd, -0.2, epsilon = 1e-12);
        assert_relative_eq!(max_drawdown(&[-0.1]), -0.1, epsilon = 1e-12);
        assert_eq!(max_drawdown(&[0.1, 0.2]), 0.0);
    }

    #[test]
    fn win_rate_ignores_flat_periods() {
        let r = [0.01, 0.0, -0.01, 0.02];
        let stats = StandardStats::compute(&r, &daily(4), 252.0);
        assert_relative_eq!(stats.win_rate, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn profit_factor_and_omega() {
        let r = [0.03, -0.01, 0.01, -0.02];
        let stats = StandardStats::compute(&r, &daily(4), 252.0);
        assert_relative_eq!(stats.profit_factor, 0.04 / 0.03, epsilon = 1e-12);
        assert_relative_eq!(stats.omega, 0.04 / 0.03, epsilon = 1e-12);

        let only_wins = StandardStats::compute(&[0.01, 0.02], &daily(2), 252.0);
        assert!(only_wins.profit_factor.is_infinite());
        assert_eq!(only_wins.omega, 0.0);
    }

    #[test]
    fn var_and_cvar() {
        let r = [0.01, -0.03, 0.02, -0.01, 0.005, -0.04, 0.03];
        let stats = StandardStats::compute(&r, &daily(r.len()), 252.0);
        let expected_var = mean(&r) - Z_95 * std_dev(&r);
        assert_relative_eq!(stats.var, expected_var, epsilon = 1e-12);
        assert!(stats.cvar <= stats.var);
    }

    #[test]
    fn cagr_over_calendar_span() {
        let start = daily(1)[0];
        let ts = vec![start, start + Duration::days(365)];
        let stats = StandardStats::compute(&[0.0, 0.21], &ts, 252.0);
        let years = 365.0 / 365.25;
        assert_relative_eq!(stats.cagr, 1.21f64.powf(1.0 / years) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn cagr_falls_back_to_period_count() {
        let start = daily(1)[0];
        let ts = vec![start; 2];
        let stats = StandardStats::compute(&[0.1, 0.1], &ts, 2.0);
        // two periods at two per year is one year
        assert_relative_eq!(stats.cagr, 0.21, epsilon = 1e-12);
    }

    #[test]
    fn calmar_and_recovery_use_drawdown() {
        let r = [0.1, -0.2, 0.1];
        let stats = StandardStats::compute(&r, &daily(3), 252.0);
        assert_relative_eq!(stats.calmar, stats.cagr / 0.2, epsilon = 1e-9);
        assert_relative_eq!(stats.recovery_factor, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn moments_match_sample_formulas() {
        let x = [1.0, 2.0, 3.0, 4.0, 10.0];
        // reference values from the adjusted Fisher-Pearson estimators
        assert_relative_eq!(skewness(&x), 1.697_056_3, epsilon = 1e-6);
        assert_relative_eq!(kurtosis(&x), 3.152, epsilon = 1e-9);
        assert_eq!(skewness(&[1.0, 2.0]), 0.0);
        assert_eq!(kurtosis(&[1.0, 1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn quantile_interpolates() {
        let x = [5.0, 1.0, 3.0, 2.0, 4.0];
        assert_relative_eq!(quantile(&x, 0.05), 1.2, epsilon = 1e-12);
        assert_relative_eq!(quantile(&x, 0.5), 3.0, epsilon = 1e-12);
        assert_eq!(quantile(&[], 0.05), 0.0);
    }
}
