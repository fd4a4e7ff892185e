use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("regression failed: {0}")]
    Model(String),

    #[error("roster is empty")]
    EmptyRoster,

    #[error("not enough students for the train/test split: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
