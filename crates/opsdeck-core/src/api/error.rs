use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Cut on a char boundary - localized error bodies are not ASCII.
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 422 => ApiError::Rejected(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the request never produced a server verdict (DNS failure,
    /// refused connection, timeout). The session manager treats these
    /// differently from an actual rejection: a transport failure during
    /// startup hydration must not force a logout.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "invalid credentials"),
            ApiError::Rejected(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "locked"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_status_errors_are_not_transport() {
        assert!(!ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_transport());
        assert!(!ApiError::from_status(StatusCode::BAD_GATEWAY, "").is_transport());
        assert!(!ApiError::InvalidResponse("garbage".into()).is_transport());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let msg = err.to_string();
        assert!(msg.len() < 700);
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_truncation_backs_off_to_a_char_boundary() {
        // A two-byte char straddles the cut point, as in a localized error
        // message; slicing mid-char would panic.
        let body = format!("{}ééé", "x".repeat(MAX_ERROR_BODY_LENGTH - 1));
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().contains("truncated"));
    }
}
