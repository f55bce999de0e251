use reqwest::StatusCode;

/// Errors surfaced by the client tier.
///
/// Transport failures (`Network`) are kept apart from failures the server
/// reported (`Server`) so callers can show "try again later" for the former
/// and the server's own message for the latter.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// The caller cancelled the load before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// An authenticated call was attempted with no signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server rejected the identity token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
