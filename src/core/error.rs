use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No companion state for user: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CompanionError>;
