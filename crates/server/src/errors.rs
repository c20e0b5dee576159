use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

impl From<service::errors::ServiceError> for StartupError {
    fn from(e: service::errors::ServiceError) -> Self {
        StartupError::InvalidConfig(e.to_string())
    }
}
