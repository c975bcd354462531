/// Failure talking to the CycleGraph backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `detail` is the `detail`/`error` string from the body, if any.
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_detail_when_present() {
        let with = ApiError::Status {
            status: 404,
            detail: Some("session not found".into()),
        };
        assert_eq!(with.to_string(), "HTTP 404: session not found");
        assert_eq!(with.status(), Some(404));
        assert_eq!(with.detail(), Some("session not found"));

        let without = ApiError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(without.to_string(), "HTTP 502");
        assert_eq!(without.detail(), None);
    }
}
