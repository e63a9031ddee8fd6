//! Lexical and facet checks for simple-typed values.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::model::{Builtin, SimpleType};

static DECIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("Invalid decimal regex")
});

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").expect("Invalid date regex")
});

static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$",
    )
    .expect("Invalid dateTime regex")
});

/// Every problem with `raw` as a value of `simple`, as messages.
pub(crate) fn check_value(simple: &SimpleType, raw: &str) -> Vec<String> {
    let mut problems = Vec::new();
    // Strings keep their whitespace; every other built-in collapses it.
    let value = match simple.builtin {
        Builtin::String => raw,
        _ => raw.trim(),
    };

    let decimal = match simple.builtin {
        Builtin::String => None,
        Builtin::Decimal => match parse_decimal(value) {
            Some(decimal) => Some(decimal),
            None => {
                problems.push(format!("'{value}' is not a valid decimal"));
                return problems;
            }
        },
        Builtin::Boolean | Builtin::Date | Builtin::DateTime => {
            if !is_valid(simple.builtin, value) {
                problems.push(format!(
                    "'{value}' is not a valid {}",
                    simple.builtin.name()
                ));
                return problems;
            }
            None
        }
    };

    let facets = &simple.facets;
    let length = value.chars().count();
    if let Some(expected) = facets.length
        && length != expected
    {
        problems.push(format!("'{value}' has length {length}, expected {expected}"));
    }
    if let Some(min) = facets.min_length
        && length < min
    {
        problems.push(format!("'{value}' is shorter than the minimum length {min}"));
    }
    if let Some(max) = facets.max_length
        && length > max
    {
        problems.push(format!(
            "'{value}' is longer than the maximum length {max} ({length} characters)"
        ));
    }

    for group in &facets.patterns {
        if !group.regex.is_match(value) {
            problems.push(format!(
                "'{value}' does not match pattern '{}'",
                group.sources.join("' or '")
            ));
        }
    }

    if !facets.enumeration.is_empty() && !facets.enumeration.iter().any(|allowed| allowed == value) {
        problems.push(format!(
            "'{value}' is not one of {}",
            facets.enumeration.join(", ")
        ));
    }

    if let Some(decimal) = decimal {
        let normalized = decimal.normalize();
        let fraction = normalized.scale();
        let digits = normalized.mantissa().unsigned_abs().to_string().len();
        if let Some(max) = facets.fraction_digits
            && fraction > max
        {
            problems.push(format!(
                "'{value}' has {fraction} fraction digits, more than {max}"
            ));
        }
        if let Some(max) = facets.total_digits
            && digits > max
        {
            problems.push(format!("'{value}' has {digits} digits, more than {max}"));
        }
        if let Some(min) = facets.min_inclusive
            && decimal < min
        {
            problems.push(format!("'{value}' is less than the minimum {min}"));
        }
        if let Some(max) = facets.max_inclusive
            && decimal > max
        {
            problems.push(format!("'{value}' is greater than the maximum {max}"));
        }
    }

    problems
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    if !DECIMAL_REGEX.is_match(value) {
        return None;
    }
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    let (sign, digits) = match unsigned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", unsigned),
    };
    let digits = digits.trim_end_matches('.');
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    Decimal::from_str(&format!("{sign}{digits}")).ok()
}

fn is_valid(builtin: Builtin, value: &str) -> bool {
    match builtin {
        Builtin::Boolean => matches!(value, "true" | "false" | "1" | "0"),
        Builtin::Date => DATE_REGEX
            .captures(value)
            .is_some_and(|caps| valid_date(&caps) && valid_timezone(caps.get(4).map(|m| m.as_str()))),
        Builtin::DateTime => DATE_TIME_REGEX.captures(value).is_some_and(|caps| {
            valid_date(&caps)
                && valid_time(&caps)
                && valid_timezone(caps.get(8).map(|m| m.as_str()))
        }),
        Builtin::String | Builtin::Decimal => true,
    }
}

fn number<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn valid_date(caps: &Captures<'_>) -> bool {
    match (number::<i32>(caps, 1), number::<u32>(caps, 2), number::<u32>(caps, 3)) {
        (Some(year), Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
        _ => false,
    }
}

fn valid_time(caps: &Captures<'_>) -> bool {
    match (number::<u32>(caps, 4), number::<u32>(caps, 5), number::<u32>(caps, 6)) {
        // End-of-day form.
        (Some(24), Some(0), Some(0)) => caps.get(7).is_none_or(|m| m.as_str().trim_matches(['.', '0']).is_empty()),
        (Some(hour), Some(minute), Some(second)) => {
            NaiveTime::from_hms_opt(hour, minute, second).is_some()
        }
        _ => false,
    }
}

fn valid_timezone(zone: Option<&str>) -> bool {
    let Some(zone) = zone else {
        return true;
    };
    if zone == "Z" {
        return true;
    }
    let hours: u32 = zone[1..3].parse().unwrap_or(99);
    let minutes: u32 = zone[4..6].parse().unwrap_or(99);
    minutes < 60 && (hours < 14 || (hours == 14 && minutes == 0))
}
