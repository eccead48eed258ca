use thiserror::Error;

/// Why a cube fetch produced no data. The `Display` text is what ends up in
/// `UiState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Cube responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Invalid cube response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Failure to build a request URL from the configured base.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid cube base URL '{url}': {reason}")]
    InvalidBase { url: String, reason: String },

    #[error("Cube base URL '{0}' cannot carry path segments")]
    CannotBeABase(String),

    #[error("Date range endpoint {0} is out of range")]
    BadTimestamp(i64),
}

impl From<RequestError> for FetchError {
    fn from(error: RequestError) -> Self {
        Self::Network(error.to_string())
    }
}
