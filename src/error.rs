use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema mismatch in '{path}': missing required column(s) {}", missing.join(", "))]
    SchemaMismatch { path: String, missing: Vec<String> },

    #[error("Unknown state: {0}")]
    UnknownState(String),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
