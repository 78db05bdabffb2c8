use thiserror::Error;

use crate::{application::sources::SourceError, config::LoadError, infra::error::InfraError};

/// Errors that end the `folio` process with exit code 1.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("cms client error: {0}")]
    Source(#[from] SourceError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
