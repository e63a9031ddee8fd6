//! Per-kind value normalization.

use std::str::FromStr;

use rust_decimal::Decimal;

use pain_model::FieldKind;
use pain_model::datetime::{normalize_date_time, parse_date};

/// Parses a non-negative decimal amount. A leading `+` is accepted and a
/// negative zero becomes zero.
pub fn normalize_amount(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed.strip_prefix('+').unwrap_or(trimmed)).ok()?;
    if amount.is_zero() {
        return Some(amount.abs());
    }
    (!amount.is_sign_negative()).then_some(amount)
}

/// Canonical text for `value` read as `kind`, or `None` if it is not a
/// valid value of that kind.
pub fn normalize_value(kind: FieldKind, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Text => Some(trimmed.to_string()),
        FieldKind::Date => parse_date(trimmed).map(|date| date.format("%Y-%m-%d").to_string()),
        FieldKind::DateTime => normalize_date_time(trimmed),
        FieldKind::Amount => normalize_amount(trimmed).map(|amount| amount.to_string()),
        FieldKind::Count => trimmed
            .parse::<usize>()
            .ok()
            .map(|count| count.to_string()),
        FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Some("true".to_string()),
            "false" | "0" | "no" | "n" => Some("false".to_string()),
            _ => None,
        },
        FieldKind::Currency | FieldKind::Country | FieldKind::Code => {
            Some(trimmed.to_ascii_uppercase())
        }
        FieldKind::Iban | FieldKind::Bic => Some(
            trimmed
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect::<String>()
                .to_ascii_uppercase(),
        ),
    }
}
