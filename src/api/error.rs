use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: usize, limit: usize },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// Cuts at the nearest char boundary at or below the byte limit.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Extract the backend's `{"detail": ...}` message, falling back to
    /// the raw (truncated) body.
    fn detail_from_body(body: &str) -> String {
        #[derive(Deserialize)]
        struct Detail {
            detail: String,
        }
        match serde_json::from_str::<Detail>(body) {
            Ok(d) => d.detail,
            Err(_) => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(Self::detail_from_body(body)),
            _ => ApiError::Rejected {
                status,
                detail: Self::detail_from_body(body),
            },
        }
    }

    /// The human-readable message a screen should surface inline.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::NotFound(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_extracts_detail() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "You have already applied to this job."}"#,
        );
        match err {
            ApiError::Rejected { status, detail } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail, "You have already applied to this job.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_401_is_unauthorized() {
        let err =
            ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Invalid credentials"}"#);
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_from_status_falls_back_to_raw_body() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match err {
            ApiError::Rejected { detail, .. } => assert_eq!(detail, "<html>oops</html>"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        let detail = err.detail();
        assert!(detail.contains("truncated, 2000 total bytes"));
        assert!(detail.len() < body.len());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 3-byte chars, so the 500-byte limit falls inside a char
        let body = "€".repeat(1000);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        let detail = err.detail();
        assert!(detail.contains("total bytes"));
        let prefix = detail.split("...").next().unwrap();
        assert!(prefix.len() <= MAX_ERROR_BODY_LENGTH);
        assert!(prefix.chars().all(|c| c == '€'));
    }
}
