//! # error
//!
//! Error types for the two outbound collaborators.
//!
//! Neither error ever escapes a cycle: the notifier logs it and decides
//! between "give up until the next tick" and "retry once later".  Only
//! [`SendError::RateLimited`] leads to a retry.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure while reading market data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Market data request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The market-data API answered with a non-2xx status.
    #[error("Market data API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body was not the JSON we expected.
    #[error("Malformed market data response: {0}")]
    Decode(#[source] reqwest::Error),

    /// A decimal field could not be read as a number.
    #[error("Field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Failure while delivering a message.
#[derive(Debug, Error)]
pub enum SendError {
    /// The destination is throttling us and told us how long to wait.
    #[error("Rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Any other refusal by the Bot API (bad token, unknown chat, bad markup).
    #[error("Telegram rejected message: HTTP {status}: {description}")]
    Rejected { status: StatusCode, description: String },

    /// Transport failure.  The URL (which embeds the bot token) is stripped.
    #[error("Telegram request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Malformed Telegram response (HTTP {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl SendError {
    /// Server-supplied delay when this is a rate-limit refusal.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SendError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
