use crate::{
    api::FetchError, cache::CacheError, config::ConfigError, driver::DriverError,
    poller::PollerError, source::SourceError,
};

/// Errors that end the process.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("{0}")]
    Other(String),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Fetch(e) => AppError::Fetch(e),
            SourceError::Cache(e) => AppError::Cache(e),
        }
    }
}

impl From<PollerError> for AppError {
    fn from(err: PollerError) -> Self {
        match err {
            PollerError::DriverError(e) => AppError::Driver(e),
        }
    }
}
