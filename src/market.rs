//! # market — Binance public market data
//!
//! Two unauthenticated reads per cycle:
//!
//! | Method | Path                              | Used for                       |
//! |--------|-----------------------------------|--------------------------------|
//! | GET    | `/api/v3/ticker/price?symbol=..`  | current price                  |
//! | GET    | `/api/v3/ticker/24hr?symbol=..`   | change %, high, low, quote vol |

use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;
use crate::models::ticker::{DailyTickerResponse, PriceTickerResponse};
use crate::models::{DailyStats, PriceQuote};

/// Where a cycle reads its market values from.
pub trait MarketSource: Send + Sync + 'static {
    fn fetch_price(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<PriceQuote, FetchError>> + Send;

    fn fetch_daily_stats(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<DailyStats, FetchError>> + Send;
}

/// Binance spot REST client.  Stateless; every call is an independent GET.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client:   reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, symbol: &str) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, symbol, "GET market data");

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(FetchError::Request)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        resp.json().await.map_err(FetchError::Decode)
    }
}

impl MarketSource for BinanceClient {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceQuote, FetchError> {
        let resp: PriceTickerResponse = self.get_json("/api/v3/ticker/price", symbol).await?;
        resp.try_into()
    }

    async fn fetch_daily_stats(&self, symbol: &str) -> Result<DailyStats, FetchError> {
        let resp: DailyTickerResponse = self.get_json("/api/v3/ticker/24hr", symbol).await?;
        resp.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serves a fake Binance on an ephemeral port and returns its base URL.
    async fn spawn_fake_binance(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn price(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({ "symbol": q["symbol"], "price": "20.12340000" }))
    }

    async fn daily(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({
            "symbol":             q["symbol"],
            "priceChangePercent": "1.2345",
            "highPrice":          "21.50",
            "lowPrice":           "19.75",
            "quoteVolume":        "1500000",
            "count":              42
        }))
    }

    #[tokio::test]
    async fn test_fetches_price_and_stats() {
        let base = spawn_fake_binance(
            Router::new()
                .route("/api/v3/ticker/price", get(price))
                .route("/api/v3/ticker/24hr", get(daily)),
        )
        .await;
        let binance = BinanceClient::new(reqwest::Client::new(), base);

        let quote = binance.fetch_price("AVAXUSDT").await.unwrap();
        let stats = binance.fetch_daily_stats("AVAXUSDT").await.unwrap();

        assert_eq!(quote.price, 20.1234);
        assert_eq!(stats.quote_volume, 1_500_000.0);
        assert_eq!(stats.low_price, 19.75);
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error() {
        let base = spawn_fake_binance(Router::new().route(
            "/api/v3/ticker/price",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "code": -1121, "msg": "Invalid symbol." })),
                )
            }),
        ))
        .await;
        let binance = BinanceClient::new(reqwest::Client::new(), base);

        match binance.fetch_price("NOPE").await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("Invalid symbol"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let base = spawn_fake_binance(
            Router::new().route("/api/v3/ticker/24hr", get(|| async { "not json" })),
        )
        .await;
        let binance = BinanceClient::new(reqwest::Client::new(), base);

        assert!(matches!(
            binance.fetch_daily_stats("AVAXUSDT").await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let binance = BinanceClient::new(reqwest::Client::new(), format!("http://{addr}"));
        assert!(matches!(
            binance.fetch_price("AVAXUSDT").await,
            Err(FetchError::Request(_))
        ));
    }
}
