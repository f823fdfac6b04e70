use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {path} returned {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Response from {path} is not a {{data}} envelope: {message}")]
    Envelope { path: String, message: String },

    #[error("Could not decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("No response registered for {path}")]
    Unmocked { path: String },
}

impl ClientError {
    /// Whether trying the same request again later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Message shown to the user when a request fails.
    pub fn toast_message(&self) -> String {
        if self.is_transient() {
            format!("{self} (try again in a moment)")
        } else {
            self.to_string()
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ClientError> for airsight_core::AirsightError {
    fn from(err: ClientError) -> Self {
        airsight_core::AirsightError::Gateway {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        let server = ClientError::Status {
            path: "/airlines/top-rated".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(server.is_transient());
        assert_eq!(server.status(), Some(503));

        let missing = ClientError::Status {
            path: "/airlines/x/info".to_string(),
            status: 404,
            body: String::new(),
        };
        assert!(!missing.is_transient());
    }

    #[test]
    fn test_toast_message_hints_retry_only_when_transient() {
        let server = ClientError::Status {
            path: "/airlines/top-rated".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(server.toast_message().ends_with("(try again in a moment)"));

        let missing = ClientError::Unmocked {
            path: "/airlines/x/info".to_string(),
        };
        assert_eq!(missing.toast_message(), missing.to_string());
    }

    #[test]
    fn test_envelope_error_is_permanent() {
        let err = ClientError::Envelope {
            path: "/airlines/x/key-data".to_string(),
            message: "expected an object".to_string(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("{data}"));
    }

    #[test]
    fn test_conversion_into_core_error() {
        let err = ClientError::Configuration {
            message: "bad base url".to_string(),
        };
        let core: airsight_core::AirsightError = err.into();
        assert!(core.to_string().contains("bad base url"));
    }
}
