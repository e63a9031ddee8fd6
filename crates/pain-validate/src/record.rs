//! Pre-mapping record checks.
//!
//! A field is checked against the [`FieldKind`] of the canonical field it
//! supplies, using the same synonym lookup the mapper uses, so a column the
//! mapper would ignore is never flagged. The revision's length limits and
//! code lists are checked on the normalized value, which is what the
//! document will carry.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pain_map::{normalize_amount, normalize_value};
use pain_model::datetime::{normalize_date_time, parse_date};
use pain_model::{
    CanonicalField, DEFAULT_PARALLEL_THRESHOLD, FieldKind, FieldScope, RawRecord, RecordLayout,
    RecordPosition, ordered_map,
};
use pain_standards::{FieldRule, MappingTable};

use crate::error::{EmptySourceError, FieldValidationError, RecordCheckError};

/// Largest number of fraction digits an instructed amount may carry.
pub const MAX_AMOUNT_FRACTION_DIGITS: u32 = 5;
/// Largest number of significant digits an instructed amount may carry.
pub const MAX_AMOUNT_TOTAL_DIGITS: usize = 18;

static AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("Invalid amount regex")
});

/// Country code, check digits, then up to 30 alphanumerics.
static IBAN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Za-z0-9]{1,30}$").expect("Invalid IBAN regex")
});

/// Eight or eleven characters; the location code never starts with 0 or 1.
static BIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?$").expect("Invalid BIC regex")
});

static CURRENCY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("Invalid currency regex"));

static COUNTRY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("Invalid country regex"));

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{1,4}$").expect("Invalid code regex"));

/// What is wrong with one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssue {
    // Presence
    /// Mandatory field has no value and no default.
    Missing,

    // Format
    InvalidDate,
    InvalidDateTime,
    MalformedAmount,
    NegativeAmount,
    /// More fraction or total digits than an amount may carry.
    AmountPrecision,
    InvalidCount,
    InvalidBoolean,

    // Identifiers and codes
    InvalidCurrency,
    InvalidCountry,
    InvalidIban,
    InvalidBic,
    InvalidCode,
    /// Outside the closed code list of the target element.
    UnknownCode,
    /// Longer than the target element allows.
    TooLong,
    /// Contains a character XML 1.0 cannot carry.
    InvalidCharacter,
    /// Pushes the batch control sum past the digits it may carry.
    ControlSumPrecision,
}

impl FieldIssue {
    /// Stable identifier used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            FieldIssue::Missing => "missing",
            FieldIssue::InvalidDate => "invalid_date",
            FieldIssue::InvalidDateTime => "invalid_date_time",
            FieldIssue::MalformedAmount => "malformed_amount",
            FieldIssue::NegativeAmount => "negative_amount",
            FieldIssue::AmountPrecision => "amount_precision",
            FieldIssue::InvalidCount => "invalid_count",
            FieldIssue::InvalidBoolean => "invalid_boolean",
            FieldIssue::InvalidCurrency => "invalid_currency",
            FieldIssue::InvalidCountry => "invalid_country",
            FieldIssue::InvalidIban => "invalid_iban",
            FieldIssue::InvalidBic => "invalid_bic",
            FieldIssue::InvalidCode => "invalid_code",
            FieldIssue::UnknownCode => "unknown_code",
            FieldIssue::TooLong => "too_long",
            FieldIssue::InvalidCharacter => "invalid_character",
            FieldIssue::ControlSumPrecision => "control_sum_precision",
        }
    }

    /// Short human-readable description. Reads as a predicate of the
    /// offending value, except for [`FieldIssue::Missing`].
    pub fn message(&self) -> &'static str {
        match self {
            FieldIssue::Missing => "required value is missing",
            FieldIssue::InvalidDate => "not a valid date",
            FieldIssue::InvalidDateTime => "not a valid date-time",
            FieldIssue::MalformedAmount => "not a decimal amount",
            FieldIssue::NegativeAmount => "a negative amount",
            FieldIssue::AmountPrecision => {
                "over 5 fraction digits or 18 total digits"
            }
            FieldIssue::InvalidCount => "not a non-negative whole number",
            FieldIssue::InvalidBoolean => "not a boolean (true/false, yes/no, 1/0)",
            FieldIssue::InvalidCurrency => "not a three-letter currency code",
            FieldIssue::InvalidCountry => "not a two-letter country code",
            FieldIssue::InvalidIban => "not a valid IBAN",
            FieldIssue::InvalidBic => "not a valid BIC",
            FieldIssue::InvalidCode => "not a code of 1 to 4 letters or digits",
            FieldIssue::UnknownCode => "not one of the codes this revision allows",
            FieldIssue::TooLong => "longer than this revision allows",
            FieldIssue::InvalidCharacter => "not representable in XML",
            FieldIssue::ControlSumPrecision => {
                "an amount that takes the control sum over 18 total digits"
            }
        }
    }
}

/// One problem with one field of one source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub record: RecordPosition,
    pub field: CanonicalField,
    /// Source column the value came from; `None` when it is missing.
    pub column: Option<String>,
    pub value: Option<String>,
    pub issue: FieldIssue,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.column, &self.value) {
            (Some(column), Some(value)) => write!(
                f,
                "{}: {} (column '{column}'): '{value}' is {}",
                self.record,
                self.field,
                self.issue.message()
            ),
            _ => write!(f, "{}: {}: {}", self.record, self.field, self.issue.message()),
        }
    }
}

/// Header and transaction records of one source, split by layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordBatch<'r> {
    pub header: &'r RawRecord,
    pub transactions: &'r [RawRecord],
}

impl<'r> RecordBatch<'r> {
    /// Splits loaded records. A source that would produce no transaction is
    /// rejected here rather than yielding an empty document.
    pub fn split(
        records: &'r [RawRecord],
        layout: RecordLayout,
    ) -> Result<Self, EmptySourceError> {
        let Some(header) = records.first() else {
            return Err(EmptySourceError::NoRecords);
        };
        let transactions = match layout {
            RecordLayout::HeaderRow => &records[1..],
            RecordLayout::Inline => records,
        };
        if transactions.is_empty() {
            return Err(EmptySourceError::NoTransactions);
        }
        Ok(Self {
            header,
            transactions,
        })
    }
}

/// Checks raw records against one revision's mapping table.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator<'a> {
    mapping: &'a MappingTable,
    parallel_threshold: usize,
}

impl<'a> RecordValidator<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self {
            mapping,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Splits `records` by `layout` and checks every one of them.
    ///
    /// Returns the split batch when nothing is wrong. Otherwise every field
    /// error from every record is returned, in record order.
    pub fn validate<'r>(
        &self,
        records: &'r [RawRecord],
        layout: RecordLayout,
    ) -> Result<RecordBatch<'r>, RecordCheckError> {
        let batch = RecordBatch::split(records, layout)?;

        let mut errors = self.check_record(batch.header, RecordPosition::Header);
        let per_record = ordered_map(batch.transactions, self.parallel_threshold, |index, record| {
            self.check_record(record, RecordPosition::Transaction(index))
        });
        errors.extend(per_record.into_iter().flatten());
        // The sum is only meaningful once every amount parsed.
        if errors.is_empty() {
            errors.extend(self.check_control_sum(batch.transactions));
        }

        debug!(
            transactions = batch.transactions.len(),
            errors = errors.len(),
            "checked source records"
        );

        if errors.is_empty() {
            Ok(batch)
        } else {
            Err(FieldValidationError { errors }.into())
        }
    }

    /// Checks the fields of one record that belong to its scope.
    pub fn check_record(&self, record: &RawRecord, position: RecordPosition) -> Vec<FieldError> {
        let scope = match position {
            RecordPosition::Header => FieldScope::Header,
            RecordPosition::Transaction(_) => FieldScope::Transaction,
        };

        let mut errors = Vec::new();
        for rule in self.mapping.scoped(scope) {
            match rule.lookup(record) {
                Some((column, value)) => {
                    let issue =
                        check_value(rule.field.kind(), value).or_else(|| check_limits(rule, value));
                    if let Some(issue) = issue {
                        errors.push(FieldError {
                            record: position,
                            field: rule.field,
                            column: Some(column.to_string()),
                            value: Some(value.to_string()),
                            issue,
                        });
                    }
                }
                // A default of either form satisfies presence.
                None if rule.required && rule.default.is_none() => errors.push(FieldError {
                    record: position,
                    field: rule.field,
                    column: None,
                    value: None,
                    issue: FieldIssue::Missing,
                }),
                None => {}
            }
        }
        errors
    }
}

impl RecordValidator<'_> {
    /// First transaction at which the running control sum needs more digits
    /// than the document may carry.
    fn check_control_sum(&self, transactions: &[RawRecord]) -> Option<FieldError> {
        let rule = self.mapping.rule(CanonicalField::Amount)?;
        let mut sum = Decimal::ZERO;
        for (index, record) in transactions.iter().enumerate() {
            let Some((column, value)) = rule.lookup(record) else {
                continue;
            };
            let Some(amount) = normalize_amount(value) else {
                continue;
            };
            match sum.checked_add(amount) {
                Some(next) if total_digits(next) <= MAX_AMOUNT_TOTAL_DIGITS => sum = next,
                _ => {
                    return Some(FieldError {
                        record: RecordPosition::Transaction(index),
                        field: rule.field,
                        column: Some(column.to_string()),
                        value: Some(value.to_string()),
                        issue: FieldIssue::ControlSumPrecision,
                    });
                }
            }
        }
        None
    }
}

fn total_digits(amount: Decimal) -> usize {
    amount.normalize().mantissa().unsigned_abs().to_string().len()
}

/// Syntactic check of a non-blank value.
fn check_value(kind: FieldKind, value: &str) -> Option<FieldIssue> {
    match kind {
        FieldKind::Text => value
            .chars()
            .any(|ch| !is_xml_char(ch))
            .then_some(FieldIssue::InvalidCharacter),
        FieldKind::Date => parse_date(value.trim())
            .is_none()
            .then_some(FieldIssue::InvalidDate),
        FieldKind::DateTime => normalize_date_time(value.trim())
            .is_none()
            .then_some(FieldIssue::InvalidDateTime),
        FieldKind::Amount => check_amount(value.trim()),
        FieldKind::Count => normalize_value(kind, value)
            .is_none()
            .then_some(FieldIssue::InvalidCount),
        FieldKind::Boolean => normalize_value(kind, value)
            .is_none()
            .then_some(FieldIssue::InvalidBoolean),
        FieldKind::Currency => {
            check_pattern(&CURRENCY_REGEX, kind, value, FieldIssue::InvalidCurrency)
        }
        FieldKind::Country => check_pattern(&COUNTRY_REGEX, kind, value, FieldIssue::InvalidCountry),
        FieldKind::Iban => check_pattern(&IBAN_REGEX, kind, value, FieldIssue::InvalidIban),
        FieldKind::Bic => check_pattern(&BIC_REGEX, kind, value, FieldIssue::InvalidBic),
        FieldKind::Code => check_pattern(&CODE_REGEX, kind, value, FieldIssue::InvalidCode),
    }
}

/// Code list and length limit of `rule`, applied to a value that already
/// passed [`check_value`].
fn check_limits(rule: &FieldRule, value: &str) -> Option<FieldIssue> {
    let normalized = normalize_value(rule.field.kind(), value)?;
    if !rule.codes.is_empty() && !rule.codes.contains(&normalized) {
        return Some(FieldIssue::UnknownCode);
    }
    match rule.max_length {
        Some(max) if normalized.chars().count() > max => Some(FieldIssue::TooLong),
        _ => None,
    }
}

/// The `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Matches the normalized form, so `de89 3704 ...` is a valid IBAN.
fn check_pattern(
    pattern: &Regex,
    kind: FieldKind,
    value: &str,
    issue: FieldIssue,
) -> Option<FieldIssue> {
    match normalize_value(kind, value) {
        Some(normalized) if pattern.is_match(&normalized) => None,
        _ => Some(issue),
    }
}

fn check_amount(value: &str) -> Option<FieldIssue> {
    if !AMOUNT_REGEX.is_match(value) {
        return Some(FieldIssue::MalformedAmount);
    }
    let Ok(amount) = Decimal::from_str(value.trim_start_matches('+')) else {
        // Lexically fine but beyond 28 significant digits.
        return Some(FieldIssue::AmountPrecision);
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        return Some(FieldIssue::NegativeAmount);
    }
    if amount.normalize().scale() > MAX_AMOUNT_FRACTION_DIGITS
        || total_digits(amount) > MAX_AMOUNT_TOTAL_DIGITS
    {
        return Some(FieldIssue::AmountPrecision);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_checks() {
        assert_eq!(check_amount("150.50"), None);
        assert_eq!(check_amount("+7"), None);
        assert_eq!(check_amount("0.100000"), None);
        assert_eq!(check_amount("-0.01"), Some(FieldIssue::NegativeAmount));
        assert_eq!(check_amount("1,000.00"), Some(FieldIssue::MalformedAmount));
        assert_eq!(check_amount("1_000"), Some(FieldIssue::MalformedAmount));
        assert_eq!(check_amount("0.000001"), Some(FieldIssue::AmountPrecision));
        assert_eq!(
            check_amount("1234567890123456789"),
            Some(FieldIssue::AmountPrecision)
        );
    }

    #[test]
    fn identifiers_are_checked_after_normalization() {
        assert_eq!(check_value(FieldKind::Iban, "de89 3704 0044 0532 0130 00"), None);
        assert_eq!(
            check_value(FieldKind::Iban, "89DE37040044"),
            Some(FieldIssue::InvalidIban)
        );
        assert_eq!(check_value(FieldKind::Bic, "DEUTDEFF"), None);
        assert_eq!(check_value(FieldKind::Bic, "deutdeff500"), None);
        assert_eq!(
            check_value(FieldKind::Bic, "DEUTDE1F"),
            Some(FieldIssue::InvalidBic)
        );
        assert_eq!(check_value(FieldKind::Currency, "eur"), None);
        assert_eq!(
            check_value(FieldKind::Currency, "EURO"),
            Some(FieldIssue::InvalidCurrency)
        );
        assert_eq!(
            check_value(FieldKind::Code, "SEPA-CT"),
            Some(FieldIssue::InvalidCode)
        );
    }

    fn rule(field: CanonicalField, max_length: Option<usize>, codes: &[&str]) -> FieldRule {
        FieldRule {
            field,
            synonyms: vec![field.as_str().to_string()],
            default: None,
            required: true,
            max_length,
            codes: codes.iter().map(|code| code.to_string()).collect(),
        }
    }

    #[test]
    fn limits_apply_to_the_normalized_value() {
        let method = rule(CanonicalField::PaymentMethod, None, &["CHK", "TRF", "TRA"]);
        assert_eq!(check_limits(&method, " trf "), None);
        assert_eq!(check_limits(&method, "XYZ"), Some(FieldIssue::UnknownCode));

        let message_id = rule(CanonicalField::MessageId, Some(35), &[]);
        assert_eq!(check_limits(&message_id, &format!("  {}  ", "M".repeat(35))), None);
        assert_eq!(
            check_limits(&message_id, &"M".repeat(36)),
            Some(FieldIssue::TooLong)
        );
        // Characters, not bytes.
        assert_eq!(check_limits(&message_id, &"é".repeat(35)), None);
    }

    #[test]
    fn text_must_be_representable_in_xml() {
        assert_eq!(check_value(FieldKind::Text, "Müller & Söhne <GmbH>"), None);
        assert_eq!(check_value(FieldKind::Text, "line\tbreak"), None);
        assert_eq!(
            check_value(FieldKind::Text, "bell\u{7}"),
            Some(FieldIssue::InvalidCharacter)
        );
    }

    #[test]
    fn split_by_layout() {
        let records = vec![
            RawRecord::from_pairs([("id", "MSG-1")]),
            RawRecord::from_pairs([("id", "MSG-1")]),
        ];
        let batch = RecordBatch::split(&records, RecordLayout::HeaderRow).unwrap();
        assert_eq!(batch.transactions.len(), 1);
        let batch = RecordBatch::split(&records, RecordLayout::Inline).unwrap();
        assert_eq!(batch.transactions.len(), 2);

        assert_eq!(
            RecordBatch::split(&records[..1], RecordLayout::HeaderRow),
            Err(EmptySourceError::NoTransactions)
        );
        assert_eq!(
            RecordBatch::split(&records[..1], RecordLayout::Inline).map(|b| b.transactions.len()),
            Ok(1)
        );
        assert_eq!(
            RecordBatch::split(&[], RecordLayout::Inline),
            Err(EmptySourceError::NoRecords)
        );
    }

    #[test]
    fn field_error_display() {
        let error = FieldError {
            record: RecordPosition::Transaction(1),
            field: CanonicalField::RemittanceDate,
            column: Some("reference_date".to_string()),
            value: Some("not-a-date".to_string()),
            issue: FieldIssue::InvalidDate,
        };
        assert_eq!(
            error.to_string(),
            "transaction 2: remittance_date (column 'reference_date'): 'not-a-date' is not a valid date"
        );
    }
}
