use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlenumError {
    #[error("Not in a plenum workspace. Run 'plenum init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .plenum/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Invalid or missing argument: {0}")]
    InvalidArgument(String),

    #[error("Minutes not found: {0}")]
    MinutesNotFound(String),

    #[error("Meeting series not found: {0}")]
    SeriesNotFound(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlenumError>;
