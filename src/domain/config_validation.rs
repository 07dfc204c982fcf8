//! Configuration validation.
//!
//! Reads every section through [`ConfigPort`], applies defaults and rejects
//! values the analysis cannot run with. Validation happens once, before any
//! data is fetched.

use crate::domain::error::TickerscopeError;
use crate::domain::metrics::DEFAULT_RISK_FREE_RATE;
use crate::domain::panel::PanelConfig;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;
pub const DEFAULT_POOL_SIZE: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub source: SourceKind,
    pub csv_dir: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub pool_size: u32,
    pub market: String,
    pub lookback_days: i64,
    /// `None` disables caching.
    pub cache_ttl: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub risk_free_rate: f64,
    pub symbols: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub pretty: bool,
}

/// Validates all sections without keeping the result.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    data_settings(config)?;
    analysis_settings(config)?;
    panel_config(config)?;
    Ok(())
}

pub fn report_settings(config: &dyn ConfigPort) -> ReportSettings {
    ReportSettings {
        pretty: config.get_bool("report", "pretty", true),
    }
}

pub fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, TickerscopeError> {
    let source = match config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("csv") => SourceKind::Csv,
        Some("sqlite") => SourceKind::Sqlite,
        Some(other) => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown source '{}', expected csv or sqlite", other),
            ))
        }
    };

    let csv_dir = non_empty(config.get_string("data", "csv_dir")).map(PathBuf::from);
    let sqlite_path = non_empty(config.get_string("sqlite", "path")).map(PathBuf::from);

    match source {
        SourceKind::Csv if csv_dir.is_none() => {
            return Err(TickerscopeError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            })
        }
        SourceKind::Sqlite if sqlite_path.is_none() => {
            return Err(TickerscopeError::ConfigMissing {
                section: "sqlite".to_string(),
                key: "path".to_string(),
            })
        }
        _ => {}
    }

    let pool_size = config.get_int("sqlite", "pool_size", DEFAULT_POOL_SIZE);
    if pool_size < 1 || pool_size > u32::MAX as i64 {
        return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
    }

    let market = non_empty(config.get_string("data", "market"))
        .map(|m| m.to_uppercase())
        .unwrap_or_else(|| DEFAULT_MARKET.to_string());

    let lookback_days =
        check_lookback(config.get_int("data", "lookback_days", DEFAULT_LOOKBACK_DAYS))?;

    let ttl = config.get_int("data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);
    if ttl < 0 {
        return Err(invalid(
            "data",
            "cache_ttl_secs",
            "cache_ttl_secs must be non-negative",
        ));
    }
    let cache_ttl = (ttl > 0).then(|| Duration::from_secs(ttl as u64));

    Ok(DataSettings {
        source,
        csv_dir,
        sqlite_path,
        pool_size: pool_size as u32,
        market,
        lookback_days,
        cache_ttl,
    })
}

pub fn analysis_settings(config: &dyn ConfigPort) -> Result<AnalysisSettings, TickerscopeError> {
    let risk_free_rate = config.get_double("analysis", "risk_free_rate", DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "analysis",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    Ok(AnalysisSettings {
        risk_free_rate,
        symbols: non_empty(config.get_string("analysis", "symbols")),
    })
}

/// Indicator windows from `[indicators]`, defaulting each missing key.
pub fn panel_config(config: &dyn ConfigPort) -> Result<PanelConfig, TickerscopeError> {
    let defaults = PanelConfig::default();
    let period = |key: &str, default: usize| -> Result<usize, TickerscopeError> {
        let value = config.get_int("indicators", key, default as i64);
        if value < 1 {
            return Err(invalid(
                "indicators",
                key,
                format!("{} must be a positive period", key),
            ));
        }
        Ok(value as usize)
    };

    let panel = PanelConfig {
        sma_short: period("sma_short", defaults.sma_short)?,
        sma_long: period("sma_long", defaults.sma_long)?,
        ema_fast: period("ema_fast", defaults.ema_fast)?,
        ema_slow: period("ema_slow", defaults.ema_slow)?,
        rsi: period("rsi", defaults.rsi)?,
        macd_signal: period("macd_signal", defaults.macd_signal)?,
        bollinger_period: period("bollinger_period", defaults.bollinger_period)?,
        bollinger_k: config.get_double("indicators", "bollinger_k", defaults.bollinger_k),
        stoch_k: period("stoch_k", defaults.stoch_k)?,
        stoch_d: period("stoch_d", defaults.stoch_d)?,
        williams_r: period("williams_r", defaults.williams_r)?,
        adx: period("adx", defaults.adx)?,
        support_resistance: period("support_resistance", defaults.support_resistance)?,
        volume_average: period("volume_average", defaults.volume_average)?,
    };

    if panel.ema_fast >= panel.ema_slow {
        return Err(invalid(
            "indicators",
            "ema_fast",
            "ema_fast must be shorter than ema_slow",
        ));
    }
    if panel.sma_short >= panel.sma_long {
        return Err(invalid(
            "indicators",
            "sma_short",
            "sma_short must be shorter than sma_long",
        ));
    }
    if !panel.bollinger_k.is_finite() || panel.bollinger_k <= 0.0 {
        return Err(invalid(
            "indicators",
            "bollinger_k",
            "bollinger_k must be positive and finite",
        ));
    }

    Ok(panel)
}

/// Accepts a lookback of 2 to [`MAX_LOOKBACK_DAYS`] calendar days.
pub fn check_lookback(days: i64) -> Result<i64, TickerscopeError> {
    if !(2..=MAX_LOOKBACK_DAYS).contains(&days) {
        return Err(invalid(
            "data",
            "lookback_days",
            format!(
                "lookback of {} days is outside 2..={}",
                days, MAX_LOOKBACK_DAYS
            ),
        ));
    }
    Ok(days)
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickerscopeError {
    TickerscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
