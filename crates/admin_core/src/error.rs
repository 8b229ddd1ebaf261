use std::time::Duration;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Machine-readable classification of an [`AdminError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The server answered with a non-2xx status.
    Rejected,
    /// The response body could not be decoded.
    Decode,
    /// Local input was rejected before any request was issued.
    Validation,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AdminError {
    kind: ErrorKind,
    status: Option<u16>,
    code: Option<ErrorCode>,
    message: String,
}

impl AdminError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("request timed out after {}ms", after.as_millis()),
        )
    }

    /// Builds a rejection from a non-2xx status and whatever body came with it.
    /// A structured `{message}` payload wins over the raw body.
    pub fn rejected(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ApiError>(body) {
            Ok(payload) => (
                payload.code.unwrap_or(ErrorCode::from_status(status)),
                payload.message,
            ),
            Err(_) if body.trim().is_empty() => (
                ErrorCode::from_status(status),
                format!("request failed with status {status}"),
            ),
            Err(_) => (ErrorCode::from_status(status), body.trim().to_string()),
        };
        Self {
            kind: ErrorKind::Rejected,
            status: Some(status),
            code: Some(code),
            message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Some(ErrorCode::NotFound)
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new(ErrorKind::Timeout, err.to_string());
        }
        if err.is_decode() {
            return Self::new(ErrorKind::Decode, err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::rejected(status.as_u16(), "");
        }
        Self::new(ErrorKind::Transport, err.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Decode, err.to_string())
    }
}

impl From<url::ParseError> for AdminError {
    fn from(err: url::ParseError) -> Self {
        Self::validation(format!("invalid api url: {err}"))
    }
}
