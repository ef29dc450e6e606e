use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanfeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet not found: {0}")]
    MissingSheet(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0} invariant violation(s) found")]
    Invariants(usize),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PlanfeedError>;
