//! Analysis configuration and its validation.
//!
//! Values come from a [`ConfigPort`]; CLI flags are applied on top by the
//! caller before the pipeline runs.

use crate::domain::error::PerfscopeError;
use crate::domain::returns::DataMode;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub periods_per_year: f64,
    pub synthetic_fallback: bool,
    pub synthetic_seed: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            synthetic_fallback: true,
            synthetic_seed: DEFAULT_SYNTHETIC_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub mode: DataMode,
    /// Overrides the estimated capital base in trades mode.
    pub initial_capital: Option<f64>,
    pub metrics: MetricsConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: DataMode::Returns,
            initial_capital: None,
            metrics: MetricsConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, PerfscopeError> {
        let mode = match config.get_string("analysis", "mode") {
            Some(raw) => raw
                .parse::<DataMode>()
                .map_err(|reason| invalid("analysis", "mode", reason))?,
            None => DataMode::Returns,
        };

        let initial_capital = config
            .get_double("analysis", "initial_capital")
            .map_err(|reason| invalid("analysis", "initial_capital", reason))?
            .map(validate_initial_capital)
            .transpose()?;

        let periods_per_year = config
            .get_double("metrics", "periods_per_year")
            .map_err(|reason| invalid("metrics", "periods_per_year", reason))?
            .unwrap_or(DEFAULT_PERIODS_PER_YEAR);
        validate_periods_per_year(periods_per_year)?;

        let synthetic_seed = match config
            .get_int("metrics", "synthetic_seed")
            .map_err(|reason| invalid("metrics", "synthetic_seed", reason))?
        {
            Some(seed) => u64::try_from(seed).map_err(|_| {
                invalid(
                    "metrics",
                    "synthetic_seed",
                    "synthetic_seed must be non-negative",
                )
            })?,
            None => DEFAULT_SYNTHETIC_SEED,
        };

        let synthetic_fallback = config
            .get_bool("metrics", "synthetic_fallback")
            .map_err(|reason| invalid("metrics", "synthetic_fallback", reason))?
            .unwrap_or(true);

        Ok(Self {
            mode,
            initial_capital,
            metrics: MetricsConfig {
                periods_per_year,
                synthetic_fallback,
                synthetic_seed,
            },
        })
    }
}

pub fn validate_initial_capital(value: f64) -> Result<f64, PerfscopeError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "analysis",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(value)
}

fn validate_periods_per_year(value: f64) -> Result<(), PerfscopeError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "metrics",
            "periods_per_year",
            "periods_per_year must be positive",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PerfscopeError {
    PerfscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
