//! # PriceBell — crypto price digest for Telegram
//!
//! Every interval: read one Binance trading pair's price and 24h ticker,
//! render a Markdown digest, post it to one Telegram chat.
//!
//! ```text
//!  ┌──────────────┐  GET ticker/price   ┌──────────────┐  sendMessage  ┌──────────────┐
//!  │  Binance     │ ◀────────────────── │  Notifier    │ ────────────▶ │  Telegram    │
//!  │  REST API    │  GET ticker/24hr    │  (interval)  │  429 → retry  │  Bot API     │
//!  └──────────────┘                     └──────────────┘               └──────────────┘
//!                                              │ counters
//!                                              ▼
//!                                       GET /health (optional)
//! ```
//!
//! ## Modules
//!
//! - [`config`] - environment configuration
//! - [`market`] - [`market::MarketSource`] and the Binance client
//! - [`telegram`] - [`telegram::MessageSink`] and the Bot API client
//! - [`format`] - number formatting and the message template
//! - [`notifier`] - the cycle, the recurring timer and the rate-limit retry
//! - [`state`] - delivery counters and [`state::SchedulerState`]
//! - [`routes`] - optional `GET /health`

pub mod config;
pub mod error;
pub mod format;
pub mod market;
pub mod models;
pub mod notifier;
pub mod routes;
pub mod state;
pub mod telegram;
