use cyclegraph_api_client::ApiError;

/// Everything that can go wrong while loading sessions.
///
/// Never surfaces past the directory or detail store; both fold it into the
/// `error` string of their state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Non-2xx response from the backend.
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Transport { status: u16, detail: Option<String> },

    /// Connect, timeout or decoding failure before a usable response.
    #[error("network error: {0}")]
    Network(String),

    /// No record with this id in the active source.
    #[error("Ride not found (demo): {id}")]
    NotFound { id: String },

    /// Operation made against a source that is not active.
    #[error("{0}")]
    InvalidState(String),

    #[error("Missing ride id")]
    MissingId,

    /// Flag store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    /// Message shown to the user: the transport's detail when there is one,
    /// `fallback` for opaque transport failures, the error itself otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Transport {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Transport { detail: None, .. } | Self::Network(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, detail } => Self::Transport { status, detail },
            other => Self::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
