use thiserror::Error;

use crate::RecordId;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("record {id} not found")]
    NotFound { id: RecordId },
    #[error("backend responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidBaseUrl { .. } => "INVALID_BASE_URL",
            GatewayError::NotFound { .. } => "NOT_FOUND",
            GatewayError::Status { .. } => "BAD_STATUS",
            GatewayError::Transport(_) => "TRANSPORT",
            GatewayError::Decode(_) => "DECODE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GatewayError::NotFound { id: 3 }.code(), "NOT_FOUND");
        let status = GatewayError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(status.code(), "BAD_STATUS");
        assert_eq!(
            status.to_string(),
            "backend responded with status 500: boom"
        );
        assert!(GatewayError::NotFound { id: 3 }.is_not_found());
        assert!(!status.is_not_found());
    }
}
