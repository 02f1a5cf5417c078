use hielera_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type FileExportResult<T> = std::result::Result<T, FileExportError>;

impl From<FileExportError> for DomainError {
    fn from(err: FileExportError) -> Self {
        DomainError::CollaboratorError(anyhow::Error::new(err))
    }
}
