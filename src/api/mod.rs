mod client;
pub mod types;

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::auth::AuthError;

pub use client::*;
pub use types::*;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    NetworkTimeout,
    NetworkFailure,
    Decode,
    Unauthenticated,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Timeout(_) => ApiErrorKind::NetworkTimeout,
            ApiError::Transport(e) if e.is_timeout() => ApiErrorKind::NetworkTimeout,
            ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                ApiErrorKind::Unauthenticated
            }
            ApiError::Status { .. } | ApiError::Transport(_) | ApiError::NotConfigured(_) => {
                ApiErrorKind::NetworkFailure
            }
            ApiError::Decode(_) => ApiErrorKind::Decode,
            ApiError::Auth(_) => ApiErrorKind::Unauthenticated,
        }
    }

    /// Human-readable detail for inline messages. Prefers the `error` or
    /// `message` field of a JSON error body over the raw status line.
    pub fn detail(&self) -> String {
        if let ApiError::Status { body, .. } = self
            && let Ok(v) = serde_json::from_str::<serde_json::Value>(body)
        {
            for key in ["error", "message"] {
                if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
                    return s.to_string();
                }
            }
        }
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_timeouts_and_failures() {
        assert_eq!(
            ApiError::Timeout(Duration::from_millis(5)).kind(),
            ApiErrorKind::NetworkTimeout
        );
        let e = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert_eq!(e.kind(), ApiErrorKind::NetworkFailure);
        let e = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert_eq!(e.kind(), ApiErrorKind::Unauthenticated);
        assert_eq!(
            ApiError::Auth(AuthError::NoSession).kind(),
            ApiErrorKind::Unauthenticated
        );
    }

    #[test]
    fn detail_prefers_json_error_field() {
        let e = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: r#"{"error":"token expired"}"#.into(),
        };
        assert_eq!(e.detail(), "token expired");

        let e = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: r#"{"message":"db down"}"#.into(),
        };
        assert_eq!(e.detail(), "db down");

        let e = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "oops".into(),
        };
        assert_eq!(e.detail(), "backend returned 500 Internal Server Error: oops");
    }

    #[test]
    fn timeout_display() {
        let e = ApiError::Timeout(Duration::from_millis(5000));
        assert_eq!(e.to_string(), "request timed out after 5000ms");
    }
}
