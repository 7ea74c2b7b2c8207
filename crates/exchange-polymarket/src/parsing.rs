//! Strike and range extraction from market question text.

use regex::Regex;
use regime_odds_engine::PriceRange;
use std::sync::OnceLock;

const NUMBER_PATTERN: &str = r"\$?([\d,]+(?:\.\d+)?)";

fn number_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NUMBER_PATTERN).ok()).as_ref()
}

/// Dollar amounts in order of appearance, commas stripped.
fn numbers(question: &str) -> Vec<f64> {
    let Some(pattern) = number_pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(question)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().replace(',', "").parse().ok())
        .collect()
}

/// First dollar amount in the question, or 0 when there is none.
#[must_use]
pub fn extract_strike(question: &str) -> f64 {
    numbers(question).first().copied().unwrap_or(0.0)
}

/// Price interval named by a range question:
/// "less than X" is below X, "between A and B" is `[A, B)`, "greater than X"
/// is above X. Anything else is not a range.
#[must_use]
pub fn extract_range(question: &str) -> Option<PriceRange> {
    let lower = question.to_lowercase();
    let values = numbers(question);
    if lower.contains("less than") {
        values.first().copied().map(PriceRange::Below)
    } else if lower.contains("between") {
        match values[..] {
            [low, high, ..] => Some(PriceRange::Between(low, high)),
            _ => None,
        }
    } else if lower.contains("greater than") {
        values.first().copied().map(PriceRange::Above)
    } else {
        None
    }
}

/// Dollar amount with cents below $100 and thousands separators above.
#[must_use]
pub fn format_usd(value: f64) -> String {
    if value.abs() < 100.0 {
        return format!("${value:.2}");
    }
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

/// Short label of a range contract: `<$X`, `>$X` or `$A-B`.
#[must_use]
pub fn range_label(range: &PriceRange) -> String {
    match *range {
        PriceRange::Below(high) => format!("<{}", format_usd(high)),
        PriceRange::Above(low) => format!(">{}", format_usd(low)),
        PriceRange::Between(low, high) => {
            format!("{}-{}", format_usd(low), format_usd(high).trim_start_matches('$'))
        }
    }
}
