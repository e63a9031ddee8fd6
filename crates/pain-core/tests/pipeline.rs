use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use tempfile::TempDir;

use pain_core::{CancellationToken, Pipeline, PipelineError, RunConfig, RunReport, Stage, run};
use pain_model::{AssemblyWarning, CanonicalField, RecordLayout, SchemaVersion};
use pain_standards::embedded_registry;
use pain_validate::{EmptySourceError, SchemaResource};

const HEADER_COLUMNS: [&str; 13] = [
    "id",
    "date",
    "nb_of_txs",
    "initiator_name",
    "initiator_country_code",
    "payment_information_id",
    "payment_method",
    "batch_booking",
    "requested_execution_date",
    "debtor_name",
    "debtor_account_IBAN",
    "debtor_agent_BIC",
    "charge_bearer",
];

const TRANSACTION_COLUMNS: [&str; 8] = [
    "payment_id",
    "payment_amount",
    "creditor_agent_BIC",
    "creditor_name",
    "creditor_account_IBAN",
    "purpose_code",
    "reference_number",
    "reference_date",
];

const AMOUNTS: [&str; 4] = ["150", "300.25", "99.99", "1000"];

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
}

fn header_values(execution_date: &str, declared_count: usize) -> Vec<String> {
    [
        "MSG-0001",
        "2023-03-10T15:30:47",
        declared_count.to_string().as_str(),
        "John Doe",
        "DE",
        "Payment-Info-12345",
        "TRF",
        "true",
        execution_date,
        "Acme Corp",
        "DE75512108001245126162",
        "BANKDEFFXXX",
        "SLEV",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn transaction_values(index: usize, amount: &str) -> Vec<String> {
    [
        format!("P-{}", index + 1).as_str(),
        amount,
        "SPUEDE2UXXX",
        "Global Tech",
        "DE68210501700024690959",
        "OTHR",
        format!("Invoice-{}", index + 1).as_str(),
        "2023-03-09",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Column line, one header record, then one record per amount.
fn source_csv(execution_date: &str, amounts: &[&str]) -> String {
    let mut lines = vec![format!(
        "{},{}",
        HEADER_COLUMNS.join(","),
        TRANSACTION_COLUMNS.join(",")
    )];
    lines.push(format!(
        "{}{}",
        header_values(execution_date, amounts.len()).join(","),
        ",".repeat(TRANSACTION_COLUMNS.len())
    ));
    for (index, amount) in amounts.iter().enumerate() {
        lines.push(format!(
            "{}{}",
            ",".repeat(HEADER_COLUMNS.len()),
            transaction_values(index, amount).join(",")
        ));
    }
    lines.join("\n") + "\n"
}

fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write source");
    path
}

fn config(version: &str, data: &Path, output: &Path) -> RunConfig {
    RunConfig::new(version, data)
        .with_output_dir(output)
        .with_generated_at(generated_at())
}

fn output_files(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("list output")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn failure_kind(report: &RunReport) -> &str {
    report
        .failure
        .as_ref()
        .map_or("", |failure| failure.kind.as_str())
}

#[test]
fn header_and_four_transactions_produce_a_valid_document() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &AMOUNTS));
    let output = dir.path().join("out");

    let report = run(&config("pain.001.001.03", &data, &output));
    assert!(report.success, "{report:?}");
    assert_eq!(report.stage, Stage::Done);
    assert_eq!(report.version, Some(SchemaVersion::V03));
    assert_eq!(report.transaction_count, Some(4));
    assert_eq!(report.control_sum.map(|sum| sum.to_string()).as_deref(), Some("1550.24"));
    assert!(report.warnings.is_empty());

    let path = report.output_path.clone().expect("output path");
    assert_eq!(path, output.join("payments.pain.001.001.03.xml"));
    let xml = fs::read_to_string(&path).expect("read output");
    assert_eq!(xml.matches("<PmtInf>").count(), 1);
    assert_eq!(xml.matches("<CdtTrfTxInf>").count(), 4);
    assert_eq!(xml.matches("<NbOfTxs>4</NbOfTxs>").count(), 2);
    assert!(xml.contains("<CreDtTm>2023-03-10T15:30:47</CreDtTm>"));

    let descriptor = embedded_registry()
        .expect("registry")
        .descriptor(SchemaVersion::V03)
        .expect("descriptor");
    let schema = SchemaResource::embedded(descriptor)
        .compile()
        .expect("schema");
    assert!(schema.validate(xml.as_bytes()).passed());
}

#[test]
fn every_revision_gets_its_own_artifact() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &AMOUNTS));
    let output = dir.path().join("out");

    for version in ["03", "04", "09"] {
        let report = run(&config(version, &data, &output));
        assert!(report.success, "{version}: {report:?}");
    }
    assert_eq!(
        output_files(&output),
        vec![
            "payments.pain.001.001.03.xml",
            "payments.pain.001.001.04.xml",
            "payments.pain.001.001.09.xml",
        ]
    );
}

#[test]
fn malformed_date_halts_before_assembly() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("not-a-date", &AMOUNTS));
    let output = dir.path().join("out");
    let config = config("03", &data, &output);

    let report = run(&config);
    assert!(!report.success);
    assert_eq!(report.stage, Stage::Loaded);
    assert_eq!(failure_kind(&report), "field_validation");
    assert_eq!(report.transaction_count, None);
    assert_eq!(report.field_errors.len(), 1);
    assert_eq!(
        report.field_errors[0].field,
        CanonicalField::RequestedExecutionDate
    );
    insta::assert_snapshot!(
        report.field_errors[0].to_string(),
        @"header record: requested_execution_date (column 'requested_execution_date'): 'not-a-date' is not a valid date"
    );
    assert!(output_files(&output).is_empty());

    let mut report = RunReport::default();
    let error = Pipeline::new(&config).execute(&mut report).expect_err("must fail");
    assert!(matches!(error, PipelineError::Fields(_)));
}

#[test]
fn header_only_source_has_no_transactions() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &[]));
    let config = config("03", &data, dir.path());

    let mut report = RunReport::default();
    let error = Pipeline::new(&config).execute(&mut report).expect_err("must fail");
    assert!(matches!(
        error,
        PipelineError::Empty(EmptySourceError::NoTransactions)
    ));
    assert_eq!(error.stage(), Stage::Validated);
    assert_eq!(output_files(dir.path()), vec!["payments.csv"]);
}

#[test]
fn source_without_records_is_empty() {
    let dir = TempDir::new().expect("temp dir");
    let columns_only = format!(
        "{},{}\n",
        HEADER_COLUMNS.join(","),
        TRANSACTION_COLUMNS.join(",")
    );
    let data = write_source(dir.path(), "payments.csv", &columns_only);

    let mut report = RunReport::default();
    let error = Pipeline::new(&config("03", &data, dir.path()))
        .execute(&mut report)
        .expect_err("must fail");
    assert!(matches!(error, PipelineError::Empty(EmptySourceError::NoRecords)));
    assert_eq!(error.kind(), "empty_source");

    let blank = write_source(dir.path(), "blank.csv", "");
    let report = run(&config("03", &blank, dir.path()));
    assert_eq!(failure_kind(&report), "empty_source");
}

#[test]
fn table_name_is_sanitized_before_querying() {
    let dir = TempDir::new().expect("temp dir");
    let data = dir.path().join("payments.db");
    let connection = Connection::open(&data).expect("create db");
    let columns: Vec<String> = HEADER_COLUMNS
        .iter()
        .chain(TRANSACTION_COLUMNS.iter())
        .map(|column| format!("\"{column}\" TEXT"))
        .collect();
    connection
        .execute_batch(&format!(
            "CREATE TABLE table_123_invalid_ ({});",
            columns.join(", ")
        ))
        .expect("create table");

    let width = HEADER_COLUMNS.len() + TRANSACTION_COLUMNS.len();
    let placeholders = vec!["?"; width].join(", ");
    let insert = format!("INSERT INTO table_123_invalid_ VALUES ({placeholders})");
    let mut rows = vec![header_values("2023-03-12", 2)];
    rows[0].resize(width, String::new());
    for (index, amount) in ["150", "300.25"].iter().enumerate() {
        let mut row = vec![String::new(); HEADER_COLUMNS.len()];
        row.extend(transaction_values(index, amount));
        rows.push(row);
    }
    for row in &rows {
        connection
            .execute(&insert, rusqlite::params_from_iter(row.iter()))
            .expect("insert row");
    }
    drop(connection);

    let output = dir.path().join("out");
    let report = run(&config("03", &data, &output).with_table("123 invalid!"));
    assert!(report.success, "{report:?}");
    assert_eq!(report.transaction_count, Some(2));
    assert_eq!(output_files(&output), vec!["payments.pain.001.001.03.xml"]);
}

#[test]
fn unsupported_version_fails_before_any_io() {
    let config = RunConfig::new("pain.001.001.99", "/nonexistent/payments.csv")
        .with_xsd("/nonexistent/schema.xsd")
        .with_output_dir("/nonexistent/out");

    let report = run(&config);
    assert!(!report.success);
    assert_eq!(report.stage, Stage::Pending);
    assert_eq!(report.version, None);
    assert_eq!(failure_kind(&report), "unsupported_version");
    assert_eq!(
        report.failure.as_ref().map(|failure| failure.stage),
        Some(Stage::Configured)
    );

    let mut report = RunReport::default();
    let error = Pipeline::new(&config).execute(&mut report).expect_err("must fail");
    assert!(matches!(error, PipelineError::UnsupportedVersion(_)));
}

#[test]
fn declared_count_mismatch_is_only_a_warning() {
    let dir = TempDir::new().expect("temp dir");
    let csv = source_csv("2023-03-12", &["10", "20"]).replacen(
        "2023-03-10T15:30:47,2,",
        "2023-03-10T15:30:47,7,",
        1,
    );
    let data = write_source(dir.path(), "payments.csv", &csv);

    let report = run(&config("04", &data, dir.path()));
    assert!(report.success, "{report:?}");
    assert_eq!(
        report.warnings,
        vec![AssemblyWarning::CountMismatch {
            declared: 7,
            actual: 2
        }]
    );
    let xml = fs::read_to_string(report.output_path.expect("output")).expect("read output");
    assert!(xml.contains("<NbOfTxs>2</NbOfTxs>"));
    assert!(!xml.contains("<NbOfTxs>7</NbOfTxs>"));
}

#[test]
fn schema_failure_leaves_no_artifact() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &AMOUNTS));
    let output = dir.path().join("out");
    let foreign_schema = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../pain-standards/data/xsd/pain.001.001.09.xsd");

    let report = run(&config("03", &data, &output).with_xsd(foreign_schema));
    assert!(!report.success);
    assert_eq!(report.stage, Stage::Serialized);
    assert_eq!(failure_kind(&report), "validation_failure");
    assert!(!report.violations.is_empty());
    assert!(report.output_path.is_none());
    assert!(output_files(&output).is_empty());
}

#[test]
fn unreadable_schema_override_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &AMOUNTS));

    let report = run(&config("03", &data, dir.path()).with_xsd(dir.path().join("missing.xsd")));
    assert_eq!(failure_kind(&report), "schema_resource");
    assert_eq!(report.stage, Stage::Pending);
    assert_eq!(report.version, Some(SchemaVersion::V03));
}

#[test]
fn missing_source_is_unavailable() {
    let dir = TempDir::new().expect("temp dir");
    let report = run(&config("03", &dir.path().join("absent.csv"), dir.path()));
    assert_eq!(failure_kind(&report), "source_unavailable");
    assert_eq!(report.stage, Stage::Configured);
}

#[test]
fn cancelled_token_stops_before_the_next_stage() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &AMOUNTS));
    let token = CancellationToken::new();
    token.cancel();

    let report = run(&config("03", &data, dir.path()).with_cancellation(token));
    assert_eq!(failure_kind(&report), "cancelled");
    assert_eq!(report.stage, Stage::Pending);
    assert_eq!(output_files(dir.path()), vec!["payments.csv"]);
}

#[test]
fn inline_layout_reads_header_fields_from_the_first_row() {
    let dir = TempDir::new().expect("temp dir");
    let mut lines = vec![format!(
        "{},{}",
        HEADER_COLUMNS.join(","),
        TRANSACTION_COLUMNS.join(",")
    )];
    for (index, amount) in ["5", "7.50", "12"].iter().enumerate() {
        lines.push(format!(
            "{},{}",
            header_values("2023-03-12", 3).join(","),
            transaction_values(index, amount).join(",")
        ));
    }
    let data = write_source(dir.path(), "inline.csv", &(lines.join("\n") + "\n"));

    let report = run(&config("09", &data, dir.path()).with_layout(RecordLayout::Inline));
    assert!(report.success, "{report:?}");
    assert_eq!(report.transaction_count, Some(3));
    assert_eq!(report.control_sum.map(|sum| sum.to_string()).as_deref(), Some("24.50"));
}

#[test]
fn parallel_and_sequential_runs_write_identical_documents() {
    let dir = TempDir::new().expect("temp dir");
    let amounts: Vec<String> = (1..=40).map(|cents| format!("{cents}.01")).collect();
    let amounts: Vec<&str> = amounts.iter().map(String::as_str).collect();
    let data = write_source(dir.path(), "payments.csv", &source_csv("2023-03-12", &amounts));

    let sequential =
        run(&config("03", &data, &dir.path().join("seq")).with_parallel_threshold(usize::MAX));
    let parallel = run(&config("03", &data, &dir.path().join("par")).with_parallel_threshold(1));
    let read = |report: &RunReport| {
        fs::read(report.output_path.as_ref().expect("output")).expect("read output")
    };
    assert_eq!(read(&sequential), read(&parallel));
}

#[test]
fn report_serializes_for_machine_consumers() {
    let dir = TempDir::new().expect("temp dir");
    let data = write_source(dir.path(), "payments.csv", &source_csv("not-a-date", &AMOUNTS));
    let report = run(&config("03", &data, dir.path()));

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["success"], false);
    assert_eq!(json["stage"], "loaded");
    assert_eq!(json["version"], "pain.001.001.03");
    assert_eq!(json["failure"]["stage"], "validated");
    assert_eq!(json["failure"]["kind"], "field_validation");
    assert_eq!(json["field_errors"][0]["issue"], "invalid_date");
}
