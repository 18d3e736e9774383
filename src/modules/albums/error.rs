use folio_http::error::AppError;
use thiserror::Error;

use super::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("{0}")]
    Validation(String),

    #[error("album not found")]
    NotFound,

    #[error("\"{name}\" already exists")]
    Conflict { name: String },

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<RepositoryError> for AlbumError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NameTaken { name } => AlbumError::Conflict { name },
            RepositoryError::NotFound(_) => AlbumError::NotFound,
            RepositoryError::DuplicateId(id) => {
                AlbumError::Storage(anyhow::anyhow!("album id {id} collided with an existing record"))
            }
            RepositoryError::Storage(err) => AlbumError::Storage(err),
        }
    }
}

impl From<AlbumError> for AppError {
    fn from(err: AlbumError) -> Self {
        match err {
            AlbumError::Validation(message) => AppError::validation(message),
            AlbumError::NotFound => AppError::not_found("album not found"),
            conflict @ AlbumError::Conflict { .. } => AppError::conflict(conflict.to_string()),
            AlbumError::Storage(err) => AppError::Internal(err),
        }
    }
}
