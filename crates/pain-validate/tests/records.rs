use pain_model::{CanonicalField, RawRecord, RecordLayout, RecordPosition, SchemaVersion};
use pain_standards::{MappingTable, embedded_registry};
use pain_validate::{
    EmptySourceError, FieldError, FieldIssue, RecordCheckError, RecordValidator,
};

fn mapping(version: SchemaVersion) -> &'static MappingTable {
    let registry = embedded_registry().expect("registry");
    &registry.descriptor(version).expect("descriptor").mapping
}

fn header() -> RawRecord {
    header_with_execution_date("2023-03-12")
}

fn header_with_execution_date(date: &str) -> RawRecord {
    RawRecord::from_pairs([
        ("id", "MSG-0001"),
        ("date", "2023-03-10T15:30:47"),
        ("initiator_name", "John Doe"),
        ("payment_information_id", "Payment-Info-12345"),
        ("requested_execution_date", date),
        ("debtor_name", "Acme Corp"),
        ("debtor_account_IBAN", "DE75512108001245126162"),
        ("debtor_agent_BIC", "BANKDEFFXXX"),
    ])
}

fn transaction(id: &str, amount: &str) -> RawRecord {
    RawRecord::from_pairs([
        ("payment_id", id),
        ("payment_amount", amount),
        ("creditor_name", "Global Tech"),
        ("creditor_account_IBAN", "DE68210501700024690959"),
    ])
}

fn raw_field_errors(result: Result<impl Sized, RecordCheckError>) -> Vec<FieldError> {
    match result {
        Err(RecordCheckError::Fields(failure)) => failure.errors,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected field errors"),
    }
}

fn field_errors(result: Result<impl Sized, RecordCheckError>) -> Vec<String> {
    match result {
        Err(RecordCheckError::Fields(failure)) => {
            failure.errors.iter().map(ToString::to_string).collect()
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected field errors"),
    }
}

#[test]
fn clean_source_passes_and_is_split() {
    let records = vec![header(), transaction("P-1", "150"), transaction("P-2", "300.25")];
    let batch = RecordValidator::new(mapping(SchemaVersion::V03))
        .validate(&records, RecordLayout::HeaderRow)
        .expect("valid");
    assert_eq!(batch.header, &records[0]);
    assert_eq!(batch.transactions.len(), 2);
}

#[test]
fn every_error_is_reported_at_once() {
    let records = vec![
        header_with_execution_date("2023-13-01"),
        transaction("P-1", "-10"),
        transaction("P-2", "abc"),
        RawRecord::from_pairs([("payment_amount", "5")]),
    ];
    let errors = field_errors(
        RecordValidator::new(mapping(SchemaVersion::V03)).validate(&records, RecordLayout::HeaderRow),
    );
    insta::assert_snapshot!(errors.join("\n"), @r"
    header record: requested_execution_date (column 'requested_execution_date'): '2023-13-01' is not a valid date
    transaction 1: amount (column 'payment_amount'): '-10' is a negative amount
    transaction 2: amount (column 'payment_amount'): 'abc' is not a decimal amount
    transaction 3: end_to_end_id: required value is missing
    transaction 3: creditor_name: required value is missing
    transaction 3: creditor_account_iban: required value is missing
    ");
}

#[test]
fn defaults_satisfy_presence() {
    let records = vec![header(), transaction("P-1", "1")];
    let validator = RecordValidator::new(mapping(SchemaVersion::V09));
    let errors = validator.check_record(&records[1], RecordPosition::Transaction(0));
    assert!(
        errors
            .iter()
            .all(|error| error.field != CanonicalField::Currency),
        "{errors:?}"
    );
}

#[test]
fn parallel_and_sequential_checks_agree() {
    let mut records = vec![header()];
    for index in 0..40 {
        let amount = if index % 7 == 0 { "1.0000001" } else { "10.5" };
        records.push(transaction(&format!("P-{index}"), amount));
    }
    let table = mapping(SchemaVersion::V04);
    let sequential = field_errors(
        RecordValidator::new(table)
            .with_parallel_threshold(usize::MAX)
            .validate(&records, RecordLayout::HeaderRow),
    );
    let parallel = field_errors(
        RecordValidator::new(table)
            .with_parallel_threshold(1)
            .validate(&records, RecordLayout::HeaderRow),
    );
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.len(), 6);
}

#[test]
fn empty_sources_are_rejected() {
    let validator = RecordValidator::new(mapping(SchemaVersion::V03));
    assert!(matches!(
        validator.validate(&[], RecordLayout::HeaderRow),
        Err(RecordCheckError::Empty(EmptySourceError::NoRecords))
    ));
    assert!(matches!(
        validator.validate(&[header()], RecordLayout::HeaderRow),
        Err(RecordCheckError::Empty(EmptySourceError::NoTransactions))
    ));
}

#[test]
fn issue_codes_are_stable() {
    assert_eq!(FieldIssue::Missing.code(), "missing");
    assert_eq!(FieldIssue::InvalidIban.code(), "invalid_iban");
}

#[test]
fn lengths_and_code_lists_follow_the_revision() {
    let message_id = "M".repeat(40);
    let creditor_name = "N".repeat(200);
    let records = vec![
        RawRecord::from_pairs([
            ("id", message_id.as_str()),
            ("initiator_name", "John Doe"),
            ("payment_information_id", "Payment-Info-12345"),
            ("payment_method", "XYZ"),
            ("requested_execution_date", "2023-03-12"),
            ("debtor_name", "Acme Corp"),
            ("debtor_account_IBAN", "DE75512108001245126162"),
            ("debtor_agent_BIC", "BANKDEFFXXX"),
            ("charge_bearer", "slev"),
        ]),
        RawRecord::from_pairs([
            ("payment_id", "P-1"),
            ("payment_amount", "10"),
            ("charge_bearer", "NONE"),
            ("creditor_agent_BIC", "SPUEDE2UXXX"),
            ("creditor_name", creditor_name.as_str()),
            ("creditor_account_IBAN", "DE68210501700024690959"),
        ]),
    ];

    for version in SchemaVersion::ALL {
        let errors = raw_field_errors(
            RecordValidator::new(mapping(version)).validate(&records, RecordLayout::HeaderRow),
        );
        let found: Vec<_> = errors
            .iter()
            .map(|error| (error.record, error.field, error.issue))
            .collect();
        assert_eq!(
            found,
            vec![
                (RecordPosition::Header, CanonicalField::MessageId, FieldIssue::TooLong),
                (
                    RecordPosition::Header,
                    CanonicalField::PaymentMethod,
                    FieldIssue::UnknownCode
                ),
                (
                    RecordPosition::Transaction(0),
                    CanonicalField::ChargeBearer,
                    FieldIssue::UnknownCode
                ),
                (
                    RecordPosition::Transaction(0),
                    CanonicalField::CreditorName,
                    FieldIssue::TooLong
                ),
            ],
            "{version}"
        );
    }
}

#[test]
fn values_at_the_limits_are_accepted() {
    let message_id = "M".repeat(35);
    let creditor_name = "Ä".repeat(140);
    let records = vec![
        RawRecord::from_pairs([
            ("id", message_id.as_str()),
            ("initiator_name", "John Doe"),
            ("payment_information_id", "Payment-Info-12345"),
            ("payment_method", "chk"),
            ("requested_execution_date", "2023-03-12"),
            ("debtor_name", "Acme Corp"),
            ("debtor_account_IBAN", "DE75512108001245126162"),
            ("debtor_agent_BIC", "BANKDEFFXXX"),
        ]),
        RawRecord::from_pairs([
            ("payment_id", "P-1"),
            ("payment_amount", "10"),
            ("charge_bearer", "SHAR"),
            ("creditor_agent_BIC", "SPUEDE2UXXX"),
            ("creditor_name", creditor_name.as_str()),
            ("creditor_account_IBAN", "DE68210501700024690959"),
        ]),
    ];
    for version in SchemaVersion::ALL {
        let result =
            RecordValidator::new(mapping(version)).validate(&records, RecordLayout::HeaderRow);
        assert!(result.is_ok(), "{version}: {result:?}");
    }
}

#[test]
fn control_sum_must_fit_its_digits() {
    let records = vec![
        header(),
        transaction("P-1", "9999999999999.9999"),
        transaction("P-2", "0.00001"),
        transaction("P-3", "100000"),
    ];
    let errors = field_errors(
        RecordValidator::new(mapping(SchemaVersion::V03)).validate(&records, RecordLayout::HeaderRow),
    );
    insta::assert_snapshot!(errors.join("\n"), @"transaction 3: amount (column 'payment_amount'): '100000' is an amount that takes the control sum over 18 total digits");
}

#[test]
fn text_outside_the_xml_character_range_is_rejected() {
    let records = vec![
        header(),
        RawRecord::from_pairs([
            ("payment_id", "P-1"),
            ("payment_amount", "10"),
            ("creditor_name", "Global\u{1b}Tech"),
            ("creditor_account_IBAN", "DE68210501700024690959"),
        ]),
    ];
    let errors = raw_field_errors(
        RecordValidator::new(mapping(SchemaVersion::V04)).validate(&records, RecordLayout::HeaderRow),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, CanonicalField::CreditorName);
    assert_eq!(errors[0].issue, FieldIssue::InvalidCharacter);
}
