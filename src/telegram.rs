//! # telegram — Bot API delivery
//!
//! Sends the formatted digest with `sendMessage`.  The Bot API always answers
//! with a JSON envelope:
//!
//! ```json
//! { "ok": false, "error_code": 429,
//!   "description": "Too Many Requests: retry after 5",
//!   "parameters": { "retry_after": 5 } }
//! ```
//!
//! A 429 carrying `parameters.retry_after` becomes [`SendError::RateLimited`];
//! every other refusal becomes [`SendError::Rejected`].

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::SendError;

/// Text rendering mode understood by the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    /// Legacy Markdown: `*bold*`, `` `code` ``
    Markdown,
}

/// Where a cycle delivers its message.
pub trait MessageSink: Send + Sync + 'static {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

// ─── Wire Format ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id:    &'a str,
    text:       &'a str,
    parse_mode: ParseMode,
}

#[derive(Debug, Deserialize)]
struct BotResponse<T> {
    ok:          bool,
    result:      Option<T>,
    error_code:  Option<u16>,
    description: Option<String>,
    parameters:  Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// Subset of the `User` object returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id:       i64,
    pub username: Option<String>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Long-lived Bot API session: one token, one pooled HTTP client.
#[derive(Clone)]
pub struct TelegramClient {
    client:   reqwest::Client,
    base_url: String,
    token:    String,
}

// Hand-written so the token never shows up in logs.
impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token:    token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    /// Verifies the token and returns the bot's own identity.
    pub async fn get_me(&self) -> Result<BotIdentity, SendError> {
        let resp = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;

        let (status, envelope) = read_envelope::<BotIdentity>(resp).await?;
        if !envelope.ok {
            return Err(refusal(status, &envelope));
        }
        envelope.result.ok_or_else(|| SendError::Rejected {
            status,
            description: "getMe returned no result".to_string(),
        })
    }
}

impl MessageSink for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str, parse_mode: ParseMode) -> Result<(), SendError> {
        debug!(chat_id, len = text.len(), "Sending Telegram message");

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text, parse_mode })
            .send()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;

        let (status, envelope) = read_envelope::<serde_json::Value>(resp).await?;
        if envelope.ok {
            Ok(())
        } else {
            Err(refusal(status, &envelope))
        }
    }
}

async fn read_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<(StatusCode, BotResponse<T>), SendError> {
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| SendError::Request(e.without_url()))?;

    let envelope = serde_json::from_slice(&body)
        .map_err(|source| SendError::Decode { status, source })?;
    Ok((status, envelope))
}

/// Classifies a non-`ok` envelope.
fn refusal<T>(status: StatusCode, envelope: &BotResponse<T>) -> SendError {
    let throttled = status == StatusCode::TOO_MANY_REQUESTS || envelope.error_code == Some(429);
    let retry_after = envelope.parameters.as_ref().and_then(|p| p.retry_after);

    match retry_after {
        Some(secs) if throttled => SendError::RateLimited {
            retry_after: Duration::from_secs(secs),
        },
        _ => SendError::Rejected {
            status,
            description: envelope
                .description
                .clone()
                .unwrap_or_else(|| "no description".to_string()),
        },
    }
}
