//! # config
//!
//! Reads the notifier's configuration from environment variables.
//! `main` loads an optional `.env` first via `dotenvy`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Quote assets recognised when deriving a display label from the symbol.
const QUOTE_ASSETS: &[&str] = &[
    "FDUSD", "USDT", "USDC", "BUSD", "TUSD", "BTC", "ETH", "BNB", "EUR", "TRY",
];

/// Everything the notifier needs for its lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token
    pub bot_token:        String,
    /// Destination chat: numeric id or `@channelname`
    pub chat_id:          String,
    /// Market-data symbol, e.g. `"AVAXUSDT"`
    pub symbol:           String,
    /// Symbol as rendered in the message, e.g. `"AVAX/USDT"`
    pub pair_label:       String,
    /// Tick period of the recurring timer
    pub notify_interval:  Duration,
    pub binance_url:      String,
    pub telegram_url:     String,
    /// Client-level timeout handed to reqwest
    pub http_timeout:     Duration,
    /// Bind address of `GET /health`; `None` disables the endpoint
    pub status_addr:      Option<SocketAddr>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable is required")?;

        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .context("TELEGRAM_CHAT_ID environment variable is required")?;

        let symbol = std::env::var("SYMBOL")
            .unwrap_or_else(|_| "AVAXUSDT".to_string())
            .to_uppercase();

        let pair_label = std::env::var("PAIR_LABEL")
            .unwrap_or_else(|_| derive_pair_label(&symbol));

        let interval_secs: u64 = std::env::var("NOTIFY_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("NOTIFY_INTERVAL_SECS must be a number")?;
        if interval_secs == 0 {
            bail!("NOTIFY_INTERVAL_SECS must be greater than zero");
        }

        let timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a number")?;

        let status_addr = match std::env::var("STATUS_ADDR") {
            Ok(raw) => Some(
                raw.parse()
                    .with_context(|| format!("STATUS_ADDR is not a socket address: '{raw}'"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            bot_token,
            chat_id,
            symbol,
            pair_label,
            notify_interval: Duration::from_secs(interval_secs),
            binance_url:     trim_base(std::env::var("BINANCE_API_URL").unwrap_or_else(|_| "https://api.binance.com".to_string())),
            telegram_url:    trim_base(std::env::var("TELEGRAM_API_URL").unwrap_or_else(|_| "https://api.telegram.org".to_string())),
            http_timeout:    Duration::from_secs(timeout_secs),
            status_addr,
        })
    }
}

/// `"AVAXUSDT"` → `"AVAX/USDT"`. Unknown quote assets leave the symbol as is.
pub fn derive_pair_label(symbol: &str) -> String {
    QUOTE_ASSETS
        .iter()
        .find_map(|quote| {
            symbol
                .strip_suffix(quote)
                .filter(|base| !base.is_empty())
                .map(|base| format!("{base}/{quote}"))
        })
        .unwrap_or_else(|| symbol.to_string())
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
