//! CLI definition and dispatch.
//!
//! Every subcommand loads and validates the INI config first, then builds the
//! data source (CSV or SQLite, optionally behind the TTL cache). Progress goes
//! to the log on stderr; results go to stdout or to `--output`.

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::cached_data_port::CachedDataPort;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{analysis_document, JsonReportAdapter};
use crate::domain::analysis::{analyze, AnalysisReport};
use crate::domain::comparison::{rank_assets_with, AssetInput, ComparisonResult};
use crate::domain::config_validation::{
    analysis_settings, check_lookback, data_settings, panel_config, report_settings,
    validate_config, DataSettings, SourceKind,
};
use crate::domain::error::TickerscopeError;
use crate::domain::panel::{build_panel_with, Column, PanelConfig};
use crate::domain::summary::summarize;
use crate::domain::universe::{fetch_series, load_universe, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "tickerscope",
    version,
    about = "Technical indicators, signals and multi-asset ranking for daily price data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Indicators, signal summary and metrics for one symbol
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(long)]
        market: Option<String>,
        /// Last day of the lookback window (YYYY-MM-DD, default today)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Lookback length in calendar days
        #[arg(long)]
        days: Option<i64>,
        /// Write a JSON report here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Score and rank several symbols
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma separated symbols (default: [analysis] symbols)
        #[arg(short, long)]
        symbols: Option<String>,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        days: Option<i64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List available symbols for a market
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        market: Option<String>,
    },
    /// Show stored data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        /// Default: every symbol in the market
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        market: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(command: Command) -> Result<(), TickerscopeError> {
    match command {
        Command::Analyze {
            config,
            symbol,
            market,
            end,
            days,
            output,
            format,
        } => {
            let config = load_config(&config)?;
            let request = Request::resolve(&config, market.as_deref(), end, days)?;
            let data_port = build_data_port(&request.data)?;
            let report = run_analyze(data_port.as_ref(), &request, &symbol)?;
            emit_analysis(&config, &report, output.as_deref(), format)
        }
        Command::Compare {
            config,
            symbols,
            market,
            end,
            days,
            output,
            format,
        } => {
            let config = load_config(&config)?;
            let request = Request::resolve(&config, market.as_deref(), end, days)?;
            let codes = resolve_symbols(symbols.as_deref(), &config)?;
            let data_port = build_data_port(&request.data)?;
            let result = run_compare(data_port.as_ref(), &request, &codes)?;
            emit_comparison(&config, &result, output.as_deref(), format)
        }
        Command::ListSymbols { config, market } => {
            let config = load_config(&config)?;
            let data = data_settings(&config)?;
            let market = resolve_market(market.as_deref(), &data);
            let symbols = build_data_port(&data)?.list_symbols(&market)?;
            if symbols.is_empty() {
                warn!(market = %market, "no symbols found");
            }
            for symbol in &symbols {
                println!("{}", symbol);
            }
            info!(count = symbols.len(), market = %market, "symbols listed");
            Ok(())
        }
        Command::Info {
            config,
            symbol,
            market,
        } => {
            let config = load_config(&config)?;
            let data = data_settings(&config)?;
            let market = resolve_market(market.as_deref(), &data);
            let data_port = build_data_port(&data)?;
            run_info(data_port.as_ref(), symbol.as_deref(), &market)
        }
        Command::Validate { config } => {
            info!(path = %config.display(), "validating config");
            let config = load_config(&config)?;
            validate_config(&config)?;
            let data = data_settings(&config)?;
            let panel = panel_config(&config)?;
            println!("Configuration is valid.");
            println!(
                "  source: {:?}, market: {}, lookback: {} days",
                data.source, data.market, data.lookback_days
            );
            println!(
                "  indicators: {}",
                Column::ALL
                    .iter()
                    .map(|c| c.name(&panel))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(())
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TickerscopeError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Validated settings plus the resolved date window for one run.
#[derive(Debug, Clone)]
pub struct Request {
    pub data: DataSettings,
    pub panel: PanelConfig,
    pub risk_free_rate: f64,
    pub market: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Request {
    pub fn resolve(
        config: &dyn ConfigPort,
        market: Option<&str>,
        end: Option<NaiveDate>,
        days: Option<i64>,
    ) -> Result<Self, TickerscopeError> {
        validate_config(config)?;
        let data = data_settings(config)?;
        let analysis = analysis_settings(config)?;
        let panel = panel_config(config)?;

        let days = check_lookback(days.unwrap_or(data.lookback_days))?;
        let end_date = end.unwrap_or_else(|| Local::now().date_naive());
        let start_date = Duration::try_days(days)
            .and_then(|span| end_date.checked_sub_signed(span))
            .ok_or_else(|| TickerscopeError::ConfigInvalid {
                section: "data".to_string(),
                key: "lookback_days".to_string(),
                reason: format!("{} days before {} is out of range", days, end_date),
            })?;

        Ok(Self {
            market: resolve_market(market, &data),
            data,
            panel,
            risk_free_rate: analysis.risk_free_rate,
            start_date,
            end_date,
        })
    }
}

fn resolve_market(market: Option<&str>, data: &DataSettings) -> String {
    market
        .map(|m| m.trim().to_uppercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| data.market.clone())
}

/// `--symbols` wins over `[analysis] symbols`.
pub fn resolve_symbols(
    symbols: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, TickerscopeError> {
    let list = match symbols {
        Some(s) => s.to_string(),
        None => analysis_settings(config)?
            .symbols
            .ok_or_else(|| TickerscopeError::ConfigMissing {
                section: "analysis".to_string(),
                key: "symbols".to_string(),
            })?,
    };
    Ok(parse_codes(&list)?)
}

pub fn build_data_port(data: &DataSettings) -> Result<Box<dyn DataPort>, TickerscopeError> {
    let source: Box<dyn DataPort> = match data.source {
        SourceKind::Csv => {
            let dir = data
                .csv_dir
                .clone()
                .ok_or_else(|| TickerscopeError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                })?;
            Box::new(CsvAdapter::new(dir))
        }
        SourceKind::Sqlite => open_sqlite(data)?,
    };

    Ok(match data.cache_ttl {
        Some(ttl) => Box::new(CachedDataPort::new(source, ttl)),
        None => source,
    })
}

#[cfg(feature = "sqlite")]
fn open_sqlite(data: &DataSettings) -> Result<Box<dyn DataPort>, TickerscopeError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let path = data
        .sqlite_path
        .as_deref()
        .ok_or_else(|| TickerscopeError::ConfigMissing {
            section: "sqlite".to_string(),
            key: "path".to_string(),
        })?;
    let adapter = SqliteAdapter::open(path, data.pool_size)?;
    adapter.initialize_schema()?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_data: &DataSettings) -> Result<Box<dyn DataPort>, TickerscopeError> {
    Err(TickerscopeError::DataSource {
        reason: "built without the sqlite feature".to_string(),
    })
}

pub fn run_analyze(
    data_port: &dyn DataPort,
    request: &Request,
    symbol: &str,
) -> Result<AnalysisReport, TickerscopeError> {
    let code = symbol.trim().to_uppercase();
    info!(
        code = %code,
        market = %request.market,
        start = %request.start_date,
        end = %request.end_date,
        "fetching"
    );
    let series = fetch_series(
        data_port,
        &code,
        &request.market,
        request.start_date,
        request.end_date,
    )?;
    Ok(analyze(&series, &request.panel, request.risk_free_rate))
}

pub fn run_compare(
    data_port: &dyn DataPort,
    request: &Request,
    codes: &[String],
) -> Result<ComparisonResult, TickerscopeError> {
    if codes.len() < 2 {
        warn!(count = codes.len(), "comparing fewer than two symbols");
    }

    let universe = load_universe(
        data_port,
        codes,
        &request.market,
        request.start_date,
        request.end_date,
    );

    let assets: Vec<AssetInput> = universe
        .series
        .iter()
        .map(|series| AssetInput {
            id: series.code().to_string(),
            summary: summarize(&build_panel_with(series, &request.panel)),
            series: series.clone(),
        })
        .collect();

    let mut result = rank_assets_with(&assets, request.risk_free_rate);
    let mut excluded = universe.skipped_codes();
    excluded.append(&mut result.excluded);
    result.excluded = excluded;
    Ok(result)
}

fn run_info(
    data_port: &dyn DataPort,
    symbol: Option<&str>,
    market: &str,
) -> Result<(), TickerscopeError> {
    let codes = match symbol {
        Some(s) => vec![s.trim().to_uppercase()],
        None => data_port.list_symbols(market)?,
    };

    for code in &codes {
        match data_port.get_data_range(code, market) {
            Ok(Some(range)) => println!(
                "{}.{}: {} bars, {} to {}",
                code, market, range.bars, range.first, range.last
            ),
            Ok(None) => warn!(code = %code, market, "no data found"),
            Err(e) => warn!(code = %code, market, error = %e, "range query failed"),
        }
    }
    Ok(())
}

fn emit_analysis(
    config: &dyn ConfigPort,
    report: &AnalysisReport,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), TickerscopeError> {
    let writer = JsonReportAdapter::new(report_settings(config).pretty);
    if let Some(path) = output {
        return writer.write_analysis(report, path);
    }
    match format {
        OutputFormat::Json => println!("{}", writer.render(&analysis_document(report))?),
        OutputFormat::Table => print_analysis(report),
    }
    Ok(())
}

fn emit_comparison(
    config: &dyn ConfigPort,
    result: &ComparisonResult,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), TickerscopeError> {
    let writer = JsonReportAdapter::new(report_settings(config).pretty);
    if let Some(path) = output {
        return writer.write_comparison(result, path);
    }
    match format {
        OutputFormat::Json => println!("{}", writer.render(result)?),
        OutputFormat::Table => print_comparison(result),
    }
    Ok(())
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn print_analysis(report: &AnalysisReport) {
    let panel = &report.panel;
    println!("{}.{} ({} bars)", report.code, report.market, panel.len());
    if let (Some(first), Some(last)) = (panel.bars().first(), panel.bars().last()) {
        println!("Period: {} to {}", first.date, last.date);
    }

    let s = &report.summary;
    println!();
    println!("Signals");
    println!("  RSI:       {:.1} ({})", s.rsi_current, s.rsi_signal);
    println!("  Momentum:  {}", s.momentum_signal);
    println!("  MACD:      {}", s.macd_signal);
    println!("  Trend:     {}", s.trend_signal);
    println!("  Volume:    {}", s.volume_signal);
    println!("  Bollinger: {}", s.bollinger_position);
    println!("  Overall:   {}", s.overall_signal);

    println!();
    match &report.metrics {
        Some(m) => {
            println!("Performance");
            println!("  Price:        {:.2}", m.current_price);
            println!("  Total return: {:.2}%", m.total_return);
            println!("  Volatility:   {:.2}%", m.volatility);
            println!("  Sharpe:       {:.2}", m.sharpe_ratio);
            println!("  Max drawdown: {:.2}%", m.max_drawdown);
            println!(
                "  Range:        {:.2} - {:.2} ({:.0}% of range)",
                m.low, m.high, m.price_position
            );
            println!("  Volume ratio: {:.2}", m.volume_ratio);
        }
        None => println!("Performance: insufficient data"),
    }

    if let Some(row) = panel.last_row() {
        println!();
        println!("Latest indicators ({})", row.date());
        for column in Column::ALL {
            println!(
                "  {:<16} {:>12}",
                column.name(panel.config()),
                fmt_value(row.value(column))
            );
        }
    }
}

fn print_comparison(result: &ComparisonResult) {
    if result.insufficient_data {
        println!("{}", result.summary);
        for reason in &result.best_choice_reasons {
            println!("  - {}", reason);
        }
    } else {
        println!(
            "{:<5} {:<10} {:>6} {:>9} {:>9} {:>7}  Trend",
            "Rank", "Symbol", "Score", "Return%", "Vol%", "Sharpe"
        );
        for r in &result.rankings {
            println!(
                "{:<5} {:<10} {:>6} {:>9.2} {:>9.2} {:>7.2}  {}",
                r.rank,
                r.asset,
                r.score,
                r.metrics.total_return,
                r.metrics.volatility,
                r.metrics.sharpe_ratio,
                r.trend
            );
        }

        if let Some(best) = result.best() {
            println!();
            println!("Best choice: {} ({}/100)", best.asset, best.score);
            for (i, reason) in result.best_choice_reasons.iter().enumerate() {
                println!("  {}. {}", i + 1, reason);
            }
        }

        println!();
        println!("Risk:           {}", result.risk_comparison);
        println!("Returns:        {}", result.return_comparison);
        println!("Technical:      {}", result.technical_comparison);
        println!("Recommendation: {}", result.recommendation);
        println!();
        println!("{}", result.summary);
    }

    if !result.excluded.is_empty() {
        println!();
        println!("Excluded: {}", result.excluded.join(", "));
    }
}
