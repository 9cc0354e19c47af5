use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup store unavailable: {0}")]
    Unavailable(String),
    #[error("Lookup store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Lookup I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}
