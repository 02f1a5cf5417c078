use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid reporting cadence: {0}")]
    InvalidCadence(String),

    #[error("Collaborator error: {0}")]
    CollaboratorError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
