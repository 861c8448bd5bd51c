use std::path::PathBuf;
use thiserror::Error;

//errors raised while loading, plotting or summarizing backtest results
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Results file not found: {path:?}")]
    FileNotFound { path: PathBuf },
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("Invalid date '{value}' at line {line}")]
    InvalidDate { line: usize, value: String },
    #[error("Failed to parse record at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Results table is empty")]
    EmptyData,
    #[error("Output directory does not exist: {path:?}")]
    OutputDirMissing { path: PathBuf },
    #[error("Failed to render chart: {0}")]
    Plot(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
