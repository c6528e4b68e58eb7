use thiserror::Error;

/// The backing resource behind a memoized connection could not be established.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("connection could not be established: {message}")]
pub struct ConnectionError {
    message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure surfaced to the hosting runtime as an invocation error.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("host environment unavailable: {0}")]
    Environment(#[from] std::io::Error),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to serialize handler output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Stable machine-readable code, used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Environment(_) => "environment_error",
            Self::Connection(_) => "connection_error",
            Self::Fetch(_) => "fetch_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_converts_into_handler_error() {
        let error: HandlerError = ConnectionError::new("database unreachable").into();

        assert_eq!(error.code(), "connection_error");
        assert_eq!(
            error.to_string(),
            "connection could not be established: database unreachable"
        );
    }

    #[test]
    fn host_io_failure_is_an_environment_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no /proc");
        let error: HandlerError = io_error.into();

        assert_eq!(error.code(), "environment_error");
        assert_eq!(error.to_string(), "host environment unavailable: no /proc");
    }
}
