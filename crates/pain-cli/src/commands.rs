use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info_span;

use pain_core::{CancellationToken, RunReport, run};
use pain_standards::embedded_registry;

use crate::cli::GenerateArgs;
use crate::summary::{apply_table_style, header_cell};

/// Exit status for a failed run caused by the input data.
pub const EXIT_DATA_ERROR: i32 = 1;
/// Exit status for a run that could not use its configuration or resources.
pub const EXIT_RESOURCE_ERROR: i32 = 2;

pub fn run_versions() -> Result<()> {
    let registry = embedded_registry().context("load revision standards")?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Revision"),
        header_cell("Namespace"),
        header_cell("Fields"),
        header_cell("Required"),
        header_cell("Schema"),
    ]);
    apply_table_style(&mut table);
    for descriptor in registry.descriptors() {
        let required = descriptor
            .mapping
            .rules()
            .iter()
            .filter(|rule| rule.required)
            .count();
        table.add_row(vec![
            descriptor.version.message_type().to_string(),
            descriptor.namespace.clone(),
            descriptor.mapping.len().to_string(),
            required.to_string(),
            descriptor.schema_name(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Runs one generation. A failed run is still `Ok`; the error is only for
/// problems outside the pipeline, such as an unwritable report file.
pub fn run_generate(args: &GenerateArgs) -> Result<RunReport> {
    let span = info_span!("generate", data = %args.data.display());
    let _guard = span.enter();

    let mut config = args.run_config();
    if let Some(seconds) = args.timeout {
        config = config.with_cancellation(CancellationToken::with_timeout(Duration::from_secs(
            seconds,
        )));
    }
    let report = run(&config);
    if let Some(path) = &args.report_json {
        write_report_json(&report, path)?;
    }
    Ok(report)
}

pub fn write_report_json(report: &RunReport, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(report).context("serialize run report")?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("write run report to {}", path.display()))
}

/// Process exit status for a finished run.
pub fn exit_code(report: &RunReport) -> i32 {
    match report.failure.as_ref().map(|failure| failure.kind.as_str()) {
        None => 0,
        Some("empty_source" | "field_validation" | "mapping" | "validation_failure") => {
            EXIT_DATA_ERROR
        }
        Some(_) => EXIT_RESOURCE_ERROR,
    }
}
