use thiserror::Error;

/// Failure classes a completion endpoint can signal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("rate limited (429 Too Many Requests): {0}")]
    RateLimited(String),

    #[error("permission denied (PERMISSION_DENIED): {0}")]
    PermissionDenied(String),

    #[error("model call cancelled")]
    Cancelled,

    #[error("model call failed: {0}")]
    Other(String),
}

impl ModelError {
    /// Only rate limiting is worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Classify an HTTP status plus body the way the completion endpoints report them.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = format!("HTTP {status}: {body}");
        if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
            Self::RateLimited(detail)
        } else if status == 401 || status == 403 || body.contains("PERMISSION_DENIED") {
            Self::PermissionDenied(detail)
        } else {
            Self::Other(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(matches!(
            ModelError::from_status(429, "slow down"),
            ModelError::RateLimited(_)
        ));
        assert!(matches!(
            ModelError::from_status(403, ""),
            ModelError::PermissionDenied(_)
        ));
        assert!(matches!(
            ModelError::from_status(400, r#"{"status":"PERMISSION_DENIED"}"#),
            ModelError::PermissionDenied(_)
        ));
        assert!(matches!(
            ModelError::from_status(500, "boom"),
            ModelError::Other(_)
        ));
    }

    #[test]
    fn only_rate_limit_is_transient() {
        assert!(ModelError::RateLimited(String::new()).is_transient());
        assert!(!ModelError::PermissionDenied(String::new()).is_transient());
        assert!(!ModelError::Other(String::new()).is_transient());
        assert!(!ModelError::Cancelled.is_transient());
    }
}
