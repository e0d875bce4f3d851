use thiserror::Error;

use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum SeederError {
    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid fixture {0}: {1}")]
    InvalidFixture(String, serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SeederError>;
