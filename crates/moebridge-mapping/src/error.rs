use moebridge_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Event is not transformable: {0}")]
    NotTransformable(String),
    #[error("Mapping configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> Self {
        MappingError::NotTransformable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
