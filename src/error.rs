use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration name: {0:?}")]
    InvalidName(String),

    #[error("Stored RTMP URL for {0:?} does not match its platform and key")]
    InconsistentUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize configuration {name:?}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
