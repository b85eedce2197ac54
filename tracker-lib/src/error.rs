use thiserror::Error;

/// Failure talking to the analysis service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    /// No usable response: connection refused, DNS, CORS, etc.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body does not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Human-readable reason supplied by the service, if it gave one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Build a rejection from a status and raw body, pulling out FastAPI's
    /// `{"detail": "..."}` when present.
    pub fn rejected(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.trim().is_empty());
        ApiError::Rejected { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_extracts_string_detail() {
        let err = ApiError::rejected(400, r#"{"detail": "Unsupported audio format"}"#);
        assert_eq!(err.detail(), Some("Unsupported audio format"));
        assert_eq!(err.to_string(), "HTTP 400: Unsupported audio format");
    }

    #[test]
    fn test_rejected_without_usable_detail() {
        // FastAPI validation errors carry a list, not a message
        let err = ApiError::rejected(422, r#"{"detail": [{"msg": "field required"}]}"#);
        assert_eq!(err.detail(), None);
        assert_eq!(ApiError::rejected(500, "Internal Server Error").detail(), None);
        assert_eq!(ApiError::rejected(400, r#"{"detail": "  "}"#).detail(), None);
    }

    #[test]
    fn test_detail_only_for_rejections() {
        assert_eq!(ApiError::Decode("bad".into()).detail(), None);
        assert_eq!(ApiError::NotFound("session 3".into()).detail(), None);
    }
}
