//! Generic canonical field resolution.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use pain_model::datetime::parse_date;
use pain_model::{
    CanonicalField, CanonicalHeader, CanonicalTransaction, DEFAULT_PARALLEL_THRESHOLD,
    FieldScope, Party, PostalAddress, RawRecord, RecordPosition, ordered_map,
};
use pain_standards::{DefaultValue, MappingTable, VersionDescriptor};

use crate::error::{MappingError, MappingIssue, Result};
use crate::normalize::{normalize_amount, normalize_value};

/// Canonical output of one mapping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedBatch {
    pub header: CanonicalHeader,
    pub transactions: Vec<CanonicalTransaction>,
}

/// Maps raw records to the canonical model under one revision.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    descriptor: &'a VersionDescriptor,
    parallel_threshold: usize,
}

impl<'a> FieldMapper<'a> {
    pub fn new(descriptor: &'a VersionDescriptor) -> Self {
        Self {
            descriptor,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Resolves the header and every transaction. All issues from all
    /// records are collected before failing.
    pub fn map(&self, header: &RawRecord, transactions: &[RawRecord]) -> Result<MappedBatch> {
        let table = &self.descriptor.mapping;
        let mut issues = Vec::new();

        let header_values = resolve(table, FieldScope::Header, header, RecordPosition::Header, None);
        issues.extend(header_values.issues.iter().cloned());
        let canonical_header = build_header(table, &header_values, &mut issues);

        let mapped = ordered_map(transactions, self.parallel_threshold, |index, record| {
            let position = RecordPosition::Transaction(index);
            let values = resolve(
                table,
                FieldScope::Transaction,
                record,
                position,
                Some(&header_values),
            );
            let mut record_issues = values.issues.clone();
            let transaction = build_transaction(table, &values, &mut record_issues);
            (transaction, record_issues)
        });

        let mut canonical_transactions = Vec::with_capacity(mapped.len());
        for (transaction, record_issues) in mapped {
            issues.extend(record_issues);
            if let Some(transaction) = transaction {
                canonical_transactions.push(transaction);
            }
        }

        match canonical_header {
            Some(header) if issues.is_empty() => {
                debug!(
                    version = %self.descriptor.version,
                    transactions = canonical_transactions.len(),
                    "mapped records to canonical model"
                );
                Ok(MappedBatch {
                    header,
                    transactions: canonical_transactions,
                })
            }
            _ => Err(MappingError {
                version: self.descriptor.version,
                issues,
            }),
        }
    }
}

/// Normalized values of one record, keyed by canonical field.
struct Resolved {
    position: RecordPosition,
    values: BTreeMap<CanonicalField, String>,
    issues: Vec<MappingIssue>,
}

impl Resolved {
    fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

fn resolve(
    table: &MappingTable,
    scope: FieldScope,
    record: &RawRecord,
    position: RecordPosition,
    inherited: Option<&Resolved>,
) -> Resolved {
    let mut resolved = Resolved {
        position,
        values: BTreeMap::new(),
        issues: Vec::new(),
    };

    for rule in table.scoped(scope) {
        let kind = rule.field.kind();
        if let Some((_, raw)) = rule.lookup(record) {
            match normalize_value(kind, raw) {
                Some(value) => {
                    resolved.values.insert(rule.field, value);
                }
                None => resolved.issues.push(MappingIssue::InvalidValue {
                    record: position,
                    field: rule.field,
                    value: raw.to_string(),
                    expected: kind,
                }),
            }
            continue;
        }

        let fallback = match &rule.default {
            Some(DefaultValue::Literal(value)) => normalize_value(kind, value),
            Some(DefaultValue::Field(source)) => inherited
                .and_then(|values| values.get(*source))
                .map(str::to_string),
            None => None,
        };
        match fallback {
            Some(value) => {
                resolved.values.insert(rule.field, value);
            }
            None if rule.required => resolved.issues.push(MappingIssue::Unresolved {
                record: position,
                field: rule.field,
            }),
            None => {}
        }
    }
    resolved
}

/// Typed access to resolved values; reports fields the canonical model
/// cannot do without even when the table marks them optional.
struct Builder<'r> {
    table: &'r MappingTable,
    values: &'r Resolved,
    issues: &'r mut Vec<MappingIssue>,
}

impl Builder<'_> {
    fn optional(&self, field: CanonicalField) -> Option<String> {
        self.values.get(field).map(str::to_string)
    }

    fn mandatory(&mut self, field: CanonicalField) -> Option<String> {
        let value = self.optional(field);
        if value.is_none() && !self.table.is_required(field) {
            self.issues.push(MappingIssue::Unresolved {
                record: self.values.position,
                field,
            });
        }
        value
    }

    fn typed<T>(&mut self, field: CanonicalField, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.values.get(field)?;
        let parsed = parse(raw);
        if parsed.is_none() {
            self.issues.push(MappingIssue::InvalidValue {
                record: self.values.position,
                field,
                value: raw.to_string(),
                expected: field.kind(),
            });
        }
        parsed
    }

    fn party(
        &self,
        name: CanonicalField,
        street: CanonicalField,
        building: CanonicalField,
        postal: CanonicalField,
        town: CanonicalField,
        country: CanonicalField,
    ) -> Party {
        Party {
            name: self.optional(name),
            address: PostalAddress {
                street_name: self.optional(street),
                building_number: self.optional(building),
                postal_code: self.optional(postal),
                town_name: self.optional(town),
                country: self.optional(country),
            },
        }
    }
}

fn build_header(
    table: &MappingTable,
    values: &Resolved,
    issues: &mut Vec<MappingIssue>,
) -> Option<CanonicalHeader> {
    use CanonicalField as F;
    let mut builder = Builder {
        table,
        values,
        issues,
    };

    let message_id = builder.mandatory(F::MessageId);
    let payment_information_id = builder.mandatory(F::PaymentInformationId);
    let payment_method = builder.mandatory(F::PaymentMethod);
    let debtor_account_iban = builder.mandatory(F::DebtorAccountIban);
    let default_currency = builder.mandatory(F::DefaultCurrency);
    let requested_execution_date = builder
        .mandatory(F::RequestedExecutionDate)
        .and_then(|_| builder.typed(F::RequestedExecutionDate, parse_date));
    let declared_transaction_count =
        builder.typed(F::DeclaredTransactionCount, |raw| raw.parse::<usize>().ok());
    let declared_control_sum = builder.typed(F::DeclaredControlSum, normalize_amount);
    let batch_booking = builder.typed(F::BatchBooking, |raw| raw.parse::<bool>().ok());

    let initiator = builder.party(
        F::InitiatorName,
        F::InitiatorStreetName,
        F::InitiatorBuildingNumber,
        F::InitiatorPostalCode,
        F::InitiatorTownName,
        F::InitiatorCountry,
    );
    let debtor = builder.party(
        F::DebtorName,
        F::DebtorStreetName,
        F::DebtorBuildingNumber,
        F::DebtorPostalCode,
        F::DebtorTownName,
        F::DebtorCountry,
    );

    Some(CanonicalHeader {
        message_id: message_id?,
        creation_date_time: builder.optional(F::CreationDateTime),
        declared_transaction_count,
        declared_control_sum,
        initiator,
        payment_information_id: payment_information_id?,
        payment_method: payment_method?,
        batch_booking,
        service_level_code: builder.optional(F::ServiceLevelCode),
        requested_execution_date: requested_execution_date?,
        debtor,
        debtor_account_iban: debtor_account_iban?,
        debtor_agent_bic: builder.optional(F::DebtorAgentBic),
        default_charge_bearer: builder.optional(F::DefaultChargeBearer),
        default_currency: default_currency?,
    })
}

fn build_transaction(
    table: &MappingTable,
    values: &Resolved,
    issues: &mut Vec<MappingIssue>,
) -> Option<CanonicalTransaction> {
    use CanonicalField as F;
    let mut builder = Builder {
        table,
        values,
        issues,
    };

    let end_to_end_id = builder.mandatory(F::EndToEndId);
    let currency = builder.mandatory(F::Currency);
    let creditor_account_iban = builder.mandatory(F::CreditorAccountIban);
    let amount = builder
        .mandatory(F::Amount)
        .and_then(|_| builder.typed(F::Amount, |raw| Decimal::from_str(raw).ok()));
    let remittance_date = builder.typed(F::RemittanceDate, parse_date);

    let creditor = builder.party(
        F::CreditorName,
        F::CreditorStreetName,
        F::CreditorBuildingNumber,
        F::CreditorPostalCode,
        F::CreditorTownName,
        F::CreditorCountry,
    );

    Some(CanonicalTransaction {
        instruction_id: builder.optional(F::InstructionId),
        end_to_end_id: end_to_end_id?,
        currency: currency?,
        amount: amount?,
        charge_bearer: builder.optional(F::ChargeBearer),
        creditor_agent_bic: builder.optional(F::CreditorAgentBic),
        creditor,
        creditor_account_iban: creditor_account_iban?,
        purpose_code: builder.optional(F::PurposeCode),
        remittance_reference: builder.optional(F::RemittanceReference),
        remittance_date,
    })
}
