use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InsightsError>;
