pub mod config;
pub use config::{Config, DataConfig, DisplayConfig, ExportConfig, ExportFormat};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcStatsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input is empty: expected a header line")]
    EmptyInput,
    #[error("header is missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount { line: usize, expected: usize, found: usize },
    #[error("line {line}: column '{column}' is not an integer score: '{value}'")]
    InvalidScore { line: usize, column: String, value: String },
    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, value: String },
    #[error("invalid operator '{0}' (use lt, le, eq, ne, ge or gt)")]
    InvalidOperator(String),
    #[error("invalid field '{0}'")]
    InvalidField(String),
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
    #[error("invalid mode '{0}' (use and or or)")]
    InvalidMode(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WcStatsError>;
