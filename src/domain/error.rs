//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for tickerscope.
#[derive(Debug, thiserror::Error)]
pub enum TickerscopeError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("data query error: {reason}")]
    DataQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid price series for {code}: {reason}")]
    InvalidSeries { code: String, reason: String },

    #[error("no data for {code} on {market}")]
    NoData { code: String, market: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TickerscopeError> for std::process::ExitCode {
    fn from(err: &TickerscopeError) -> Self {
        let code: u8 = match err {
            TickerscopeError::Io(_) | TickerscopeError::Report { .. } => 1,
            TickerscopeError::ConfigParse { .. }
            | TickerscopeError::ConfigMissing { .. }
            | TickerscopeError::ConfigInvalid { .. } => 2,
            TickerscopeError::DataSource { .. } | TickerscopeError::DataQuery { .. } => 3,
            TickerscopeError::InvalidSeries { .. } | TickerscopeError::Universe(_) => 4,
            TickerscopeError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
