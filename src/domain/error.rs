use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown resource `{name}`")]
    UnknownResource { name: String },
    #[error("unknown credential audience `{name}`")]
    UnknownAudience { name: String },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn unknown_resource(name: impl Into<String>) -> Self {
        Self::UnknownResource { name: name.into() }
    }

    pub fn unknown_audience(name: impl Into<String>) -> Self {
        Self::UnknownAudience { name: name.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
