//! Client Error Types
//!
//! Errors from talking to the NumberX service, with the server's `detail`
//! field pulled out of error bodies.

use serde::Deserialize;
use thiserror::Error;

use crate::error::{ErrorKind, GENERIC_FAILURE_MESSAGE};

/// Errors that can occur when communicating with the service
#[derive(Error, Debug)]
pub enum ClientError {
    /// 404 from the service
    #[error("Not found: {}", .detail.as_deref().unwrap_or("resource does not exist"))]
    NotFound { detail: Option<String> },

    /// Any other non-success status
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    #[error("Request timeout")]
    Timeout,

    #[error("Service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Rejected { .. } => ErrorKind::Rejected,
            ClientError::Timeout
            | ClientError::Unavailable
            | ClientError::Request(_)
            | ClientError::Decode(_)
            | ClientError::InvalidUrl(_) => ErrorKind::Network,
        }
    }

    /// Server-provided detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::NotFound { detail } | ClientError::Rejected { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// Message to show an operator: the server's detail verbatim, or a
    /// generic message when there is none
    pub fn user_message(&self) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }

    /// Build an error from a non-success status and its raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        if status == 404 {
            ClientError::NotFound { detail }
        } else {
            ClientError::Rejected { status, detail }
        }
    }

    /// Map a transport error to the most specific variant
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: DetailField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailField {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: String,
}

/// Pull the `detail` field out of an error body.
///
/// Accepts `{"detail": "text"}` and the list form
/// `{"detail": [{"msg": "..."}, ...]}`; anything else yields `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail {
        DetailField::Text(text) => text,
        DetailField::Items(items) => items
            .into_iter()
            .map(|item| item.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };

    let detail = detail.trim().to_string();
    if detail.is_empty() {
        None
    } else {
        Some(detail)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
