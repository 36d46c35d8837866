//! # PriceBell — entry point
//!
//! ## Environment Variables
//!
//! | Variable               | Default                    | Description                         |
//! |------------------------|----------------------------|-------------------------------------|
//! | `TELEGRAM_BOT_TOKEN`   | required                   | Bot API token                       |
//! | `TELEGRAM_CHAT_ID`     | required                   | Destination chat / channel          |
//! | `SYMBOL`               | `AVAXUSDT`                 | Binance trading pair                |
//! | `PAIR_LABEL`           | derived, e.g. `AVAX/USDT`  | Pair as shown in the message        |
//! | `NOTIFY_INTERVAL_SECS` | `30`                       | Seconds between ticks               |
//! | `BINANCE_API_URL`      | `https://api.binance.com`  | Market-data base URL                |
//! | `TELEGRAM_API_URL`     | `https://api.telegram.org` | Bot API base URL                    |
//! | `HTTP_TIMEOUT_SECS`    | `10`                       | reqwest client timeout              |
//! | `STATUS_ADDR`          | unset                      | Bind address for `GET /health`      |
//! | `RUST_LOG`             | `pricebell=debug`          | Tracing filter                      |

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pricebell::{
    config::Config,
    market::BinanceClient,
    notifier::{Notifier, NotifierSettings},
    routes::status::{self, StatusContext},
    state::NotifierStats,
    telegram::TelegramClient,
};

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — prod can use real env vars) ─────────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("pricebell=debug".parse()?)
            .add_directive("reqwest=warn".parse()?)
            .add_directive("tower_http=info".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════╗
  ║   PRICEBELL — Binance → Telegram digest   ║
  ╚═══════════════════════════════════════════╝"#
    );

    let config = Config::from_env().context("Failed to load config")?;

    // ── 3. One pooled HTTP client for both APIs ──────────────────────────────
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let bot = TelegramClient::new(http.clone(), &config.telegram_url, &config.bot_token);
    match bot.get_me().await {
        Ok(me) => info!(bot_id = me.id, username = ?me.username, "Telegram session ready"),
        Err(e) => warn!(error = %e, "Could not verify Telegram bot token — continuing"),
    }

    let market = BinanceClient::new(http, &config.binance_url);
    let stats = Arc::new(NotifierStats::new());

    // ── 4. Optional status endpoint ──────────────────────────────────────────
    if let Some(addr) = config.status_addr {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind STATUS_ADDR {addr}"))?;
        let app = status::router(StatusContext {
            symbol: Arc::from(config.symbol.as_str()),
            stats:  Arc::clone(&stats),
        });

        info!(?addr, "🩺 Status endpoint listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Status endpoint stopped");
            }
        });
    }

    // ── 5. Recurring notifier (runs until the process is killed) ─────────────
    let notifier = Arc::new(Notifier::new(market, bot, NotifierSettings::from(&config), stats));

    info!(
        symbol   = %config.symbol,
        label    = %config.pair_label,
        chat_id  = %config.chat_id,
        interval = ?config.notify_interval,
        "🔔 PriceBell started"
    );

    notifier.run().await;

    Ok(())
}
