//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::{load_path, read_path};
use crate::domain::config::{validate_initial_capital, AnalysisConfig};
use crate::domain::error::PerfscopeError;
use crate::domain::metrics::{keys, MetricsBundle};
use crate::domain::returns::{describe_column, DataMode};
use crate::domain::session::SessionResult;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "perfscope", about = "Trading performance analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an export and compute the metrics bundle
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
        /// returns, equity or trades (spreadsheet and XML input is always trades)
        #[arg(short, long)]
        mode: Option<DataMode>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        initial_capital: Option<f64>,
        /// Write the full JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show how an export would be read, without computing metrics
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            input,
            mode,
            config,
            initial_capital,
            output,
        } => build_config(config.as_deref(), mode, initial_capital)
            .and_then(|cfg| run_analyze(&input, &cfg, output.as_deref())),
        Command::Inspect { input } => run_inspect(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// File values first, then CLI flags on top.
pub fn build_config(
    config_path: Option<&Path>,
    mode: Option<DataMode>,
    initial_capital: Option<f64>,
) -> Result<AnalysisConfig, PerfscopeError> {
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            AnalysisConfig::from_port(&FileConfigAdapter::from_file(path)?)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(capital) = initial_capital {
        config.initial_capital = Some(validate_initial_capital(capital)?);
    }
    Ok(config)
}

pub fn run_analyze(
    input: &Path,
    config: &AnalysisConfig,
    output: Option<&Path>,
) -> Result<(), PerfscopeError> {
    eprintln!("Loading {}", input.display());
    let session = load_path(input, config)?;
    let metrics = session.metrics(config);

    print_summary(&session, &metrics);

    if let Some(output) = output {
        JsonReportAdapter::new().write(&session, &metrics, &output.to_string_lossy())?;
        eprintln!("\nReport written to: {}", output.display());
    }
    Ok(())
}

pub fn print_summary(session: &SessionResult, metrics: &MetricsBundle) {
    println!("=== Session ===");
    println!("Format:           {} ({})", session.format, session.detail);
    println!("Mode:             {}", session.mode);
    println!("Points:           {}", session.returns.len());
    if let Some(last) = session.equity.last_value() {
        println!("Final equity:     {:.4}", last);
    }
    if let Some(column) = &session.profit_column {
        println!("Profit column:    {}", column);
    }
    if let Some(capital) = session.capital_base {
        println!("Capital base:     {:.2}", capital);
    }

    println!("\n=== Metrics ===");
    let pct = |key: &str| metrics.number(key).unwrap_or(0.0) * 100.0;
    let num = |key: &str| metrics.number(key).unwrap_or(0.0);
    let text = |key: &str| {
        metrics
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_default()
    };
    println!(
        "Period:           {} to {}",
        text(keys::START_PERIOD),
        text(keys::END_PERIOD)
    );
    println!("CAGR:             {:.2}%", pct(keys::CAGR));
    println!("Sharpe Ratio:     {:.2}", num(keys::SHARPE));
    println!("Sortino Ratio:    {:.2}", num(keys::SORTINO));
    println!("Max Drawdown:     {:.2}%", pct(keys::MAX_DRAWDOWN));
    println!("Volatility:       {:.2}%", pct(keys::VOLATILITY));
    println!("Win Rate:         {:.1}%", pct(keys::WIN_RATE));
    println!("Profit Factor:    {:.2}", num(keys::PROFIT_FACTOR));
    println!("RR Ratio:         {:.2}", num(keys::RR_RATIO_AVG));
    println!("Trades:           {}", text(keys::NUMBER_OF_TRADES));
    println!("Avg Holding:      {}", text(keys::HOLDING_DISPLAY));
    println!("Monthly Stats:    {}", text(keys::MONTHLY_STATS_SOURCE));
}

pub fn run_inspect(input: &Path) -> Result<(), PerfscopeError> {
    let raw = read_path(input)?;

    println!("Format:           {}", raw.format);
    println!("Detail:           {}", raw.detail);
    match raw.format.forced_mode() {
        Some(mode) => println!("Mode:             {}", mode),
        None => println!("Mode:             returns or equity (choose with --mode)"),
    }
    println!("Rows:             {}", raw.frame.height());
    if let Some(trades) = &raw.trades {
        println!("Trade records:    {}", trades.len());
    }
    println!("\nColumns:");
    for index in 0..raw.frame.width() {
        println!("  {}", describe_column(&raw.frame, index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_flags_override_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[analysis]\nmode = equity\ninitial_capital = 5000\n").unwrap();

        let config = build_config(Some(file.path()), None, None).unwrap();
        assert_eq!(config.mode, DataMode::Equity);
        assert_eq!(config.initial_capital, Some(5000.0));

        let config =
            build_config(Some(file.path()), Some(DataMode::Trades), Some(20_000.0)).unwrap();
        assert_eq!(config.mode, DataMode::Trades);
        assert_eq!(config.initial_capital, Some(20_000.0));
    }

    #[test]
    fn non_positive_capital_flag_is_rejected() {
        let err = build_config(None, None, Some(0.0)).unwrap_err();
        assert!(matches!(err, PerfscopeError::ConfigInvalid { .. }));
    }

    #[test]
    fn parses_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "perfscope",
            "analyze",
            "--input",
            "trades.csv",
            "--mode",
            "TRADES",
            "--initial-capital",
            "10000",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze {
                input,
                mode,
                initial_capital,
                output,
                ..
            } => {
                assert_eq!(input, PathBuf::from("trades.csv"));
                assert_eq!(mode, Some(DataMode::Trades));
                assert_eq!(initial_capital, Some(10_000.0));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_a_usage_error() {
        let result = Cli::try_parse_from(["perfscope", "analyze", "-i", "x.csv", "-m", "candles"]);
        assert!(result.is_err());
    }
}
