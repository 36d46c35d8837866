//! Per-cycle market values. Nothing here outlives one notification cycle.

pub mod ticker;

pub use ticker::{DailyStats, PriceQuote};
