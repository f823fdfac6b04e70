use thiserror::Error;

pub type Result<T> = std::result::Result<T, TuiError>;

#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Failed to initialize terminal: {reason}")]
    TerminalInitFailed { reason: String },

    #[error("Failed to restore terminal: {reason}")]
    TerminalRestoreFailed { reason: String },

    #[error("Rendering failed: {reason}")]
    RenderingFailed { reason: String },

    #[error("Invalid color specification: '{color}'. Use format: #RRGGBB")]
    InvalidColor { color: String },

    #[error("Theme not found: '{theme}'")]
    ThemeNotFound { theme: String },

    #[error("Failed to load map geometry from {path}: {reason}")]
    GeometryLoadFailed { path: String, reason: String },

    #[error("IO operation failed: {operation} - {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl TuiError {
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

impl From<TuiError> for airsight_core::AirsightError {
    fn from(err: TuiError) -> Self {
        airsight_core::AirsightError::Tui {
            message: err.to_string(),
        }
    }
}
