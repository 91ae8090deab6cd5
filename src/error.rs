use thiserror::Error;

/// Everything that can end a submission early.
///
/// The `Display` output is exactly what the error card shows, so variants
/// that carry a server message print it verbatim.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A required form field was empty. Never reaches the network.
    #[error("Please fill in all required fields")]
    Validation,

    /// The request could not be sent or its body could not be read.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose `success` flag was false.
    #[error("{0}")]
    Rejected(String),

    /// The body was not the JSON shape we expected.
    #[error("Invalid response from server: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SearchError::Decode(e.to_string())
        } else {
            SearchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
