// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Job failed validation: {0}")]
    InvalidJob(String),

    #[error("Component '{0}' has no resolvable path")]
    UnresolvablePath(String),

    #[error("Unknown component kind: {0}")]
    UnknownKind(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
