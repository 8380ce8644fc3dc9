//! Monthly distribution statistics, with a labeled synthetic-sample
//! fallback for histories too short to aggregate by calendar month.

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::{info, warn};

use super::periodic::{bucket_sums, Period};
use super::stats::{kurtosis, mean, skewness, std_dev};
use crate::domain::returns::ReturnPoint;

/// Observed months required before the real aggregation is trusted.
const MIN_OBSERVED_MONTHS: usize = 3;
const MIN_SAMPLE_MONTHS: usize = 6;
const SAMPLE_MONTHS: usize = 12;
const MIN_POINTS_PER_MONTH: usize = 3;
const DRAW_MEAN_FACTOR: f64 = 8.0;
const DRAW_STD_FACTOR: f64 = 2.0;
const DEFAULT_MONTHLY_VOLATILITY: f64 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlySource {
    Observed,
    Synthetic,
    InsufficientData,
}

impl fmt::Display for MonthlySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthlySource::Observed => write!(f, "observed"),
            MonthlySource::Synthetic => write!(f, "synthetic"),
            MonthlySource::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
    pub volatility: f64,
    pub skew: f64,
    pub kurtosis: f64,
    pub source: MonthlySource,
}

impl MonthlyStats {
    pub fn compute(points: &[ReturnPoint], synthetic_fallback: bool, seed: u64) -> Self {
        if points.is_empty() {
            return Self::insufficient(DEFAULT_MONTHLY_VOLATILITY);
        }

        let observed = bucket_sums(points, Period::Month);
        if observed.len() >= MIN_OBSERVED_MONTHS {
            return Self::from_sample(&observed, MonthlySource::Observed);
        }

        if !synthetic_fallback {
            info!(
                months = observed.len(),
                "too few months for monthly statistics, synthetic fallback disabled"
            );
            return Self::insufficient(0.0);
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        match synthetic_months(&values, seed) {
            Some(sample) => {
                warn!(
                    months = sample.len(),
                    seed, "monthly statistics use a synthetic sample"
                );
                Self::from_sample(&sample, MonthlySource::Synthetic)
            }
            None => Self::insufficient(0.0),
        }
    }

    fn from_sample(sample: &[f64], source: MonthlySource) -> Self {
        Self {
            volatility: std_dev(sample),
            skew: skewness(sample),
            kurtosis: kurtosis(sample),
            source,
        }
    }

    fn insufficient(volatility: f64) -> Self {
        Self {
            volatility,
            skew: 0.0,
            kurtosis: 0.0,
            source: MonthlySource::InsufficientData,
        }
    }
}

/// Pseudo-months of `max(3, n/12)` consecutive returns, padded to twelve
/// months with seeded normal draws when fewer than six exist.
///
/// Deterministic for a given seed. `None` when the draw distribution
/// cannot be built from the input moments.
pub fn synthetic_months(values: &[f64], seed: u64) -> Option<Vec<f64>> {
    let chunk = MIN_POINTS_PER_MONTH.max(values.len() / SAMPLE_MONTHS);
    let mut months: Vec<f64> = values.chunks(chunk).map(|c| c.iter().sum()).collect();

    if months.len() < MIN_SAMPLE_MONTHS {
        let mu = mean(values);
        let sd = if values.len() > 1 {
            std_dev(values)
        } else {
            mu.abs() * 0.5
        };
        let normal = Normal::new(mu * DRAW_MEAN_FACTOR, sd * DRAW_STD_FACTOR).ok()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let missing = SAMPLE_MONTHS - months.len();
        months.extend((0..missing).map(|_| normal.sample(&mut rng)));
    }

    Some(months)
}
