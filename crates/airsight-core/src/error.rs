use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirsightError>;

#[derive(Error, Debug)]
pub enum AirsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {issue} ({suggestion})")]
    ConfigInvalid { issue: String, suggestion: String },

    #[error("Gateway error: {message}")]
    Gateway { message: String },

    #[error("Unexpected payload for {resource}: {message}")]
    Payload { resource: String, message: String },

    #[error("TUI error: {message}")]
    Tui { message: String },
}

impl AirsightError {
    pub fn payload(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Payload {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
