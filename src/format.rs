//! # format
//!
//! Turns one cycle's market values into the chat message.
//!
//! The message uses Telegram's legacy `Markdown` dialect: `*..*` for bold and
//! backticks for inline code.  Every value sits inside backticks, so digits,
//! commas and `.` never need escaping.

use crate::models::{DailyStats, PriceQuote};

/// Top and bottom border of every message.
pub const DELIMITER: &str = "====================";

/// Fraction digits used when the caller has no opinion (prices).
pub const DEFAULT_PRECISION: usize = 2;
pub const PERCENT_PRECISION: usize = 3;
pub const VOLUME_PRECISION: usize = 0;

// ─── Numbers ──────────────────────────────────────────────────────────────────

/// Fixed-point rendering with `,` between every three integer digits.
///
/// Rounds from the exact binary value of `value`; a value sitting exactly
/// halfway rounds away from zero.  The fractional part is never grouped.
///
/// ```text
/// format_number(1234567.891, 2) == "1,234,567.89"
/// format_number(0.5, 3)         == "0.500"
/// format_number(999.0, 0)       == "999"
/// ```
pub fn format_number(value: f64, precision: usize) -> String {
    let fixed = to_fixed(value.abs(), precision);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Non-negative `value` to exactly `precision` fraction digits.
fn to_fixed(value: f64, precision: usize) -> String {
    // `{:.N}` is exact but breaks exact ties toward the even digit.
    // Detect a true tie from the full expansion and bump it upward instead.
    let exact = format!("{value:.1074}");
    let rounded = format!("{value:.precision$}");

    let Some((_, frac)) = exact.split_once('.') else {
        return rounded;
    };
    let significant = frac.trim_end_matches('0');
    let is_tie = significant.len() == precision + 1 && significant.ends_with('5');
    if !is_tie {
        return rounded;
    }

    let int_part = &exact[..exact.len() - frac.len() - 1];
    let truncated = if precision == 0 {
        int_part.to_string()
    } else {
        format!("{int_part}.{}", &frac[..precision])
    };
    increment_last_digit(&truncated)
}

/// `"1.249"` → `"1.250"`, `"99.9"` → `"100.0"`.
fn increment_last_digit(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            d => {
                bytes[i] = d + 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    // Carried out of the leading digit
    let mut out = String::with_capacity(bytes.len() + 1);
    out.push('1');
    out.push_str(&String::from_utf8_lossy(&bytes));
    out
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ─── Message ──────────────────────────────────────────────────────────────────

/// Builds the full message: two delimiter lines around five value lines,
/// joined with `\n` and no trailing newline.
pub fn build_message(pair_label: &str, quote: &PriceQuote, stats: &DailyStats) -> String {
    [
        DELIMITER.to_string(),
        format!("🔺*{pair_label} Price*: `${}`", format_number(quote.price, DEFAULT_PRECISION)),
        format!("⏳*24hr Change*: `{}%`", format_number(stats.price_change_percent, PERCENT_PRECISION)),
        format!("📈*24hr High*: `${}`", format_number(stats.high_price, DEFAULT_PRECISION)),
        format!("📉*24hr Low*: `${}`", format_number(stats.low_price, DEFAULT_PRECISION)),
        format!("💰*24hr Trading Volume*: `${}`", format_number(stats.quote_volume, VOLUME_PRECISION)),
        DELIMITER.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_stats() -> DailyStats {
        DailyStats {
            price_change_percent: 1.2345,
            high_price:           21.50,
            low_price:            19.75,
            quote_volume:         1_500_000.0,
        }
    }

    #[test]
    fn test_groups_integer_part() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(123456.0, 1), "123,456.0");
    }

    #[test]
    fn test_pads_fraction() {
        assert_eq!(format_number(0.5, 3), "0.500");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(20.1234, 2), "20.12");
    }

    #[test]
    fn test_fraction_never_grouped() {
        assert_eq!(format_number(1234.5678, 3), "1,234.568");
    }

    #[test]
    fn test_binary_value_decides_rounding() {
        // 1.2345 is stored as 1.23449999.. so it rounds down
        assert_eq!(format_number(1.2345, 3), "1.234");
    }

    #[test]
    fn test_exact_tie_rounds_up() {
        assert_eq!(format_number(0.5, 0), "1");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(0.125, 2), "0.13");
        assert_eq!(format_number(999.5, 0), "1,000");
        assert_eq!(format_number(9.995, 2), "9.99"); // not an exact tie in binary
    }

    #[test]
    fn test_rounding_carries_into_grouping() {
        assert_eq!(format_number(999999.996, 2), "1,000,000.00");
    }

    #[test]
    fn test_negative_change() {
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
        assert_eq!(format_number(-3.12, 3), "-3.120");
        assert_eq!(format_number(-0.0001, 3), "-0.000");
        assert_eq!(format_number(-0.0, 2), "0.00");
    }

    #[test]
    fn test_every_precision_has_exact_fraction_digits() {
        for &v in &[0.0, 0.001, 7.7, 12345.6789, 98765432.1] {
            for p in 0..=3 {
                let s = format_number(v, p);
                match s.split_once('.') {
                    Some((_, frac)) => assert_eq!(frac.len(), p, "{s}"),
                    None => assert_eq!(p, 0, "{s}"),
                }
                let int_part = s.split('.').next().unwrap();
                for (i, group) in int_part.split(',').enumerate() {
                    if i == 0 {
                        assert!((1..=3).contains(&group.len()), "{s}");
                    } else {
                        assert_eq!(group.len(), 3, "{s}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_message_layout() {
        let msg = build_message("AVAX/USDT", &PriceQuote { price: 20.1234 }, &make_stats());
        let lines: Vec<&str> = msg.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], DELIMITER);
        assert_eq!(lines[1], "🔺*AVAX/USDT Price*: `$20.12`");
        assert_eq!(lines[2], "⏳*24hr Change*: `1.234%`");
        assert_eq!(lines[3], "📈*24hr High*: `$21.50`");
        assert_eq!(lines[4], "📉*24hr Low*: `$19.75`");
        assert_eq!(lines[5], "💰*24hr Trading Volume*: `$1,500,000`");
        assert_eq!(lines[6], DELIMITER);
        assert!(!msg.ends_with('\n'));
    }

    #[test]
    fn test_message_uses_label_verbatim() {
        let msg = build_message("BTC-PERP", &PriceQuote { price: 1.0 }, &make_stats());
        assert!(msg.contains("🔺*BTC-PERP Price*: `$1.00`"));
    }
}
