//! End-to-end loads from files on disk through to the metrics bundle.

mod common;

use approx::assert_relative_eq;
use common::*;
use perfscope::adapters::{load_bytes, load_path, read_path};
use perfscope::domain::config::{AnalysisConfig, MetricsConfig};
use perfscope::domain::error::PerfscopeError;
use perfscope::domain::metrics::{keys, MetricValue};
use perfscope::domain::returns::DataMode;
use perfscope::domain::input::InputFormat;

fn mode(mode: DataMode) -> AnalysisConfig {
    AnalysisConfig {
        mode,
        ..AnalysisConfig::default()
    }
}

mod returns_mode {
    use super::*;

    #[test]
    fn loads_daily_returns() {
        let fx = Fixture::new();
        let path = fx.write("daily.csv", &returns_csv(&[0.01, -0.02, 0.03, 0.0, 0.01]));

        let session = load_path(&path, &AnalysisConfig::default()).unwrap();
        assert_eq!(session.format, InputFormat::Delimited);
        assert_eq!(session.mode, DataMode::Returns);
        assert_eq!(session.returns.len(), 5);
        assert_eq!(session.equity.len(), 5);
        assert!(session.trades.is_none());
        assert!(session.capital_base.is_none());

        let metrics = session.metrics(&AnalysisConfig::default());
        assert_eq!(metrics.len(), keys::ALL.len());
        assert_eq!(
            metrics.get(keys::START_PERIOD),
            Some(&MetricValue::Text("2024-01-01".into()))
        );
        assert_eq!(
            metrics.get(keys::END_PERIOD),
            Some(&MetricValue::Text("2024-01-05".into()))
        );
        // 3 winners out of 4 non-zero days
        assert_relative_eq!(metrics.number(keys::WIN_RATE).unwrap(), 0.75);
        assert!(metrics.number(keys::MAX_DRAWDOWN).unwrap() < 0.0);
        assert_eq!(
            metrics.get(keys::MAX_WINNING_STREAK),
            Some(&MetricValue::Integer(1))
        );
    }

    #[test]
    fn short_history_uses_labeled_synthetic_monthly_stats() {
        let fx = Fixture::new();
        let path = fx.write("daily.csv", &returns_csv(&[0.01, -0.02, 0.03, 0.02]));

        let config = AnalysisConfig::default();
        let metrics = load_path(&path, &config).unwrap().metrics(&config);
        assert_eq!(
            metrics.get(keys::MONTHLY_STATS_SOURCE),
            Some(&MetricValue::Text("synthetic".into()))
        );

        let config = AnalysisConfig {
            metrics: MetricsConfig {
                synthetic_fallback: false,
                ..MetricsConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let metrics = load_path(&path, &config).unwrap().metrics(&config);
        assert_eq!(
            metrics.get(keys::MONTHLY_STATS_SOURCE),
            Some(&MetricValue::Text("insufficient_data".into()))
        );
        assert_eq!(metrics.number(keys::MONTHLY_VOLATILITY), Some(0.0));
    }

    #[test]
    fn synthetic_monthly_stats_are_reproducible() {
        let fx = Fixture::new();
        let path = fx.write("daily.csv", &returns_csv(&[0.01, -0.02, 0.03, 0.02, -0.01]));
        let config = AnalysisConfig::default();

        let first = load_path(&path, &config).unwrap().metrics(&config);
        let second = load_path(&path, &config).unwrap().metrics(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn header_only_file_is_empty_data() {
        let fx = Fixture::new();
        let path = fx.write("empty.csv", "Date,Strategy\n");
        let err = load_path(&path, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, PerfscopeError::EmptyData { .. }));
    }
}

mod equity_mode {
    use super::*;

    #[test]
    fn equity_round_trips_through_returns() {
        let csv = "time;balance\n2024-03-01;10000\n2024-03-02;10500\n2024-03-03;10290\n2024-03-04;10804.5\n";
        let session = load_bytes("balance.csv", csv.as_bytes(), &mode(DataMode::Equity)).unwrap();

        assert_eq!(session.returns.len(), 3);
        assert_relative_eq!(session.returns.values()[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(session.returns.values()[1], -0.02, epsilon = 1e-12);
        assert_relative_eq!(session.returns.values()[2], 0.05, epsilon = 1e-12);

        let rebuilt = session.returns.compounded();
        let equity = session.equity.points();
        let start = equity[0].value;
        for (curve, point) in rebuilt.points().iter().zip(&equity[1..]) {
            assert_relative_eq!(curve.value * start, point.value, epsilon = 1e-9);
        }
    }
}

mod trades_mode {
    use super::*;

    #[test]
    fn delimited_trade_log() {
        let fx = Fixture::new();
        let path = fx.write("trades.csv", TRADES_CSV);
        let config = mode(DataMode::Trades);

        let session = load_path(&path, &config).unwrap();
        assert_eq!(session.profit_column.as_deref(), Some("Profit"));
        assert_eq!(session.capital_base, Some(10_000.0));
        let trades = session.trades.as_ref().unwrap();
        assert_eq!(trades.len(), 5);
        assert_eq!(trades[2].symbol, "GBPUSD");
        assert_relative_eq!(session.returns.values()[0], 0.012);

        let metrics = session.metrics(&config);
        assert_relative_eq!(metrics.number(keys::RR_RATIO_AVG).unwrap(), 1.5);
        assert_relative_eq!(metrics.number(keys::WIN_RATE).unwrap(), 0.6);
        assert_relative_eq!(metrics.number(keys::TOTAL_COMMISSION).unwrap(), -9.0);
        assert_relative_eq!(metrics.number(keys::TOTAL_SWAP).unwrap(), -1.5);
        assert_relative_eq!(
            metrics.number(keys::TOTAL_TRANSACTION_COSTS).unwrap(),
            -10.5
        );
        assert_eq!(
            metrics.get(keys::NUMBER_OF_TRADES),
            Some(&MetricValue::Integer(5))
        );
        assert_eq!(
            metrics.get(keys::START_PERIOD),
            Some(&MetricValue::Text("2024-01-02".into()))
        );
    }

    #[test]
    fn configured_capital_replaces_estimate() {
        let config = AnalysisConfig {
            mode: DataMode::Trades,
            initial_capital: Some(1_000.0),
            ..AnalysisConfig::default()
        };
        let session = load_bytes("trades.csv", TRADES_CSV.as_bytes(), &config).unwrap();
        assert_eq!(session.capital_base, Some(1_000.0));
        assert_relative_eq!(session.returns.values()[0], 0.12);
    }

    #[test]
    fn missing_profit_column_lists_columns() {
        let csv = "symbol,volume,price\nEURUSD,1,1.1\nGBPUSD,2,1.3\n";
        let err = load_bytes("t.csv", csv.as_bytes(), &mode(DataMode::Trades)).unwrap_err();
        match &err {
            PerfscopeError::ColumnNotFound { available } => {
                assert_eq!(available, &["symbol", "volume", "price"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "profit/PnL column not found; available columns: symbol, volume, price"
        );
    }
}

mod xml_input {
    use super::*;

    #[test]
    fn broker_history_forces_trades_mode() {
        let fx = Fixture::new();
        let path = fx.write("history.xml", MT_HISTORY_XML);

        let session = load_path(&path, &mode(DataMode::Equity)).unwrap();
        assert_eq!(session.format, InputFormat::Xml);
        assert_eq!(session.mode, DataMode::Trades);
        assert_eq!(session.detail, "dialect standard");
        assert_eq!(session.returns.len(), 3);

        let config = AnalysisConfig::default();
        let metrics = session.metrics(&config);
        assert_eq!(
            metrics.get(keys::START_PERIOD),
            Some(&MetricValue::Text("2024-02-01".into()))
        );
        assert_relative_eq!(metrics.number(keys::TOTAL_COMMISSION).unwrap(), -8.0);
        assert_relative_eq!(metrics.number(keys::WORST_TRADE).unwrap(), -50.0 / 10_000.0);
        assert!(metrics.number(keys::AVG_HOLDING_HOURS).unwrap() > 0.0);
    }

    #[test]
    fn inspect_reads_without_building() {
        let fx = Fixture::new();
        let path = fx.write("history.xml", MT_HISTORY_XML);
        let raw = read_path(&path).unwrap();
        assert_eq!(raw.trades.as_ref().map(Vec::len), Some(3));
        assert!(raw.frame.columns.iter().any(|c| c == "time_close"));
    }
}

#[test]
fn missing_file_is_io_error() {
    let fx = Fixture::new();
    let err = load_path(fx.path("absent.csv"), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, PerfscopeError::Io(_)));
}
