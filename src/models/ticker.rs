//! # models::ticker
//!
//! Binance ticker payloads and the numeric values the message is built from.
//!
//! Binance sends every decimal as a JSON string (`"20.12340000"`) so that no
//! precision is lost in transit.  We keep the wire structs string-typed and
//! parse once, turning a bad number into a [`FetchError`] instead of a panic
//! or a `NaN` in the chat.

use serde::Deserialize;

use crate::error::FetchError;

// ─── Wire Format ──────────────────────────────────────────────────────────────

/// `GET /api/v3/ticker/price?symbol=..`
#[derive(Debug, Deserialize)]
pub struct PriceTickerResponse {
    pub symbol: String,
    pub price:  String,
}

/// `GET /api/v3/ticker/24hr?symbol=..` (only the fields we render).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTickerResponse {
    pub symbol:               String,
    pub price_change_percent: String,
    pub high_price:           String,
    pub low_price:            String,
    pub quote_volume:         String,
}

// ─── Parsed Values ────────────────────────────────────────────────────────────

/// Current price of one trading pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
}

/// Rolling 24-hour statistics of one trading pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyStats {
    /// Signed percentage, e.g. `1.2345` for +1.2345 %
    pub price_change_percent: f64,
    pub high_price:           f64,
    pub low_price:            f64,
    /// Volume expressed in the quote asset (USDT for `AVAXUSDT`)
    pub quote_volume:         f64,
}

impl TryFrom<PriceTickerResponse> for PriceQuote {
    type Error = FetchError;

    fn try_from(resp: PriceTickerResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            price: parse_decimal("price", &resp.price)?,
        })
    }
}

impl TryFrom<DailyTickerResponse> for DailyStats {
    type Error = FetchError;

    fn try_from(resp: DailyTickerResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            price_change_percent: parse_decimal("priceChangePercent", &resp.price_change_percent)?,
            high_price:           parse_decimal("highPrice", &resp.high_price)?,
            low_price:            parse_decimal("lowPrice", &resp.low_price)?,
            quote_volume:         parse_decimal("quoteVolume", &resp.quote_volume)?,
        })
    }
}

/// Parses a finite decimal. `"inf"` / `"NaN"` are rejected like any garbage.
fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, FetchError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FetchError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_ticker_decodes_binance_payload() {
        // Trimmed real response; extra fields must be ignored
        let body = r#"{
            "symbol": "AVAXUSDT",
            "priceChange": "0.24000000",
            "priceChangePercent": "1.2345",
            "weightedAvgPrice": "20.31",
            "highPrice": "21.50000000",
            "lowPrice": "19.75000000",
            "volume": "74000.12",
            "quoteVolume": "1500000.00000000",
            "count": 81234
        }"#;

        let resp: DailyTickerResponse = serde_json::from_str(body).unwrap();
        let stats = DailyStats::try_from(resp).unwrap();

        assert_eq!(stats.price_change_percent, 1.2345);
        assert_eq!(stats.high_price, 21.5);
        assert_eq!(stats.low_price, 19.75);
        assert_eq!(stats.quote_volume, 1_500_000.0);
    }

    #[test]
    fn test_price_ticker_decodes() {
        let resp: PriceTickerResponse =
            serde_json::from_str(r#"{"symbol":"AVAXUSDT","price":"20.12340000"}"#).unwrap();
        assert_eq!(PriceQuote::try_from(resp).unwrap().price, 20.1234);
    }

    #[test]
    fn test_garbage_price_is_invalid_number() {
        let resp = PriceTickerResponse { symbol: "AVAXUSDT".into(), price: "n/a".into() };
        match PriceQuote::try_from(resp) {
            Err(FetchError::InvalidNumber { field, value }) => {
                assert_eq!(field, "price");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(parse_decimal("lowPrice", "NaN").is_err());
        assert!(parse_decimal("lowPrice", "inf").is_err());
    }

    #[test]
    fn test_negative_change_is_kept() {
        assert_eq!(parse_decimal("priceChangePercent", "-3.120").unwrap(), -3.12);
    }
}
