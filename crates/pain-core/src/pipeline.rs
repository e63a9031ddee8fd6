//! Pipeline stages for one pain.001 generation run.
//!
//! Stages, in order:
//!
//! 0. **Configure**: resolve the revision, then compile the schema resource
//! 1. **Load**: read raw records from the delimited file or SQLite table
//! 2. **Validate**: split header and transactions, check every field
//! 3. **Map**: resolve canonical fields through the revision's mapping table
//! 4. **Assemble**: build the document tree and recompute the aggregates
//! 5. **Serialize**: render the tree to bytes
//! 6. **Schema check**: validate the bytes against the schema, exactly once
//! 7. **Write**: persist the artifact atomically
//!
//! The cancellation token is consulted before each stage starts. Nothing is
//! written unless stage 6 passed.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};

use pain_ingest::open_loader;
use pain_map::FieldMapper;
use pain_model::{AssembledDocument, RawRecord, SchemaVersion};
use pain_output::{DocumentAssembler, TemplateRenderer, XmlTreeRenderer, output_path, write_atomic};
use pain_standards::{VersionDescriptor, embedded_registry};
use pain_validate::{CompiledSchema, RecordValidator, SchemaResource, ValidationFailure};

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::report::RunReport;
use crate::stage::Stage;

/// Runs the pipeline and reports the outcome. Never panics on bad input;
/// every failure ends up in [`RunReport::failure`].
pub fn run(config: &RunConfig) -> RunReport {
    let span = info_span!(
        "pipeline",
        version = %config.version,
        source = %config.data_path.display()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut report = RunReport::new(config.version.as_str(), config.data_path.as_path());
    match Pipeline::new(config).execute(&mut report) {
        Ok(path) => {
            report.success = true;
            report.output_path = Some(path);
        }
        Err(error) => report.fail(&error),
    }
    report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if report.success {
        info!(
            stage = %report.stage,
            transactions = report.transaction_count.unwrap_or_default(),
            warnings = report.warnings.len(),
            duration_ms = report.duration_ms,
            "pipeline complete"
        );
    } else if let Some(failure) = &report.failure {
        error!(
            stage = %failure.stage,
            kind = %failure.kind,
            problems = report.problem_count(),
            duration_ms = report.duration_ms,
            "pipeline failed: {}",
            failure.message
        );
    }
    report
}

/// One run over one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'c> {
    config: &'c RunConfig,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c RunConfig) -> Self {
        Self { config }
    }

    /// Runs every stage, recording progress in `report`, and returns the
    /// artifact path. On error `report` holds the last stage completed.
    pub fn execute(&self, report: &mut RunReport) -> Result<PathBuf> {
        let config = self.config;

        // =====================================================================
        // Stage 0: Configure - revision first, so nothing is read for an
        // unsupported one
        // =====================================================================
        self.checkpoint(Stage::Configured)?;
        let version: SchemaVersion = config.version.parse()?;
        report.version = Some(version);
        let descriptor = embedded_registry()?.descriptor(version)?;
        let schema = info_span!("configure").in_scope(|| self.compile_schema(descriptor))?;
        report.reached(Stage::Configured);

        // =====================================================================
        // Stage 1: Load
        // =====================================================================
        self.checkpoint(Stage::Loaded)?;
        let records = info_span!("load").in_scope(|| self.load())?;
        report.reached(Stage::Loaded);

        // =====================================================================
        // Stage 2: Validate records
        // =====================================================================
        self.checkpoint(Stage::Validated)?;
        let batch = info_span!("validate").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let batch = RecordValidator::new(&descriptor.mapping)
                .with_parallel_threshold(config.parallel_threshold)
                .validate(&records, config.layout)?;
            debug!(
                layout = %config.layout,
                transactions = batch.transactions.len(),
                duration_ms = start.elapsed().as_millis(),
                "record checks passed"
            );
            Ok(batch)
        })?;
        report.reached(Stage::Validated);

        // =====================================================================
        // Stage 3: Map
        // =====================================================================
        self.checkpoint(Stage::Mapped)?;
        let mapped = info_span!("map").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let mapped = FieldMapper::new(descriptor)
                .with_parallel_threshold(config.parallel_threshold)
                .map(batch.header, batch.transactions)?;
            debug!(
                transactions = mapped.transactions.len(),
                duration_ms = start.elapsed().as_millis(),
                "mapping complete"
            );
            Ok(mapped)
        })?;
        report.reached(Stage::Mapped);

        // =====================================================================
        // Stage 4: Assemble
        // =====================================================================
        self.checkpoint(Stage::Assembled)?;
        let document = info_span!("assemble").in_scope(|| {
            DocumentAssembler::new(descriptor).assemble(
                &mapped.header,
                &mapped.transactions,
                config.generated_at,
            )
        });
        record_assembly(report, &document);
        report.reached(Stage::Assembled);

        // =====================================================================
        // Stage 5: Serialize
        // =====================================================================
        self.checkpoint(Stage::Serialized)?;
        let bytes = info_span!("serialize").in_scope(|| -> Result<Vec<u8>> {
            let bytes = XmlTreeRenderer::default().render(&document)?;
            debug!(bytes = bytes.len(), "document serialized");
            Ok(bytes)
        })?;
        report.reached(Stage::Serialized);

        // =====================================================================
        // Stage 6: Schema check
        // =====================================================================
        self.checkpoint(Stage::SchemaChecked)?;
        info_span!("schema_check").in_scope(|| -> Result<()> {
            let start = Instant::now();
            let validation = schema.validate(&bytes);
            debug!(
                schema = %schema.origin(),
                violations = validation.len(),
                duration_ms = start.elapsed().as_millis(),
                "schema check complete"
            );
            if validation.passed() {
                Ok(())
            } else {
                Err(ValidationFailure { report: validation }.into())
            }
        })?;
        report.reached(Stage::SchemaChecked);

        // =====================================================================
        // Stage 7: Write
        // =====================================================================
        self.checkpoint(Stage::Done)?;
        let target = output_path(&config.resolved_output_dir(), &config.data_path, version);
        info_span!("write").in_scope(|| write_atomic(&target, &bytes))?;
        info!(path = %target.display(), "artifact written");
        report.reached(Stage::Done);

        Ok(target)
    }

    fn checkpoint(&self, next: Stage) -> Result<()> {
        if self.config.is_cancelled() {
            warn!(stage = %next, "cancellation requested");
            return Err(PipelineError::Cancelled { stage: next });
        }
        Ok(())
    }

    fn compile_schema(&self, descriptor: &VersionDescriptor) -> Result<CompiledSchema> {
        let start = Instant::now();
        let resource = match &self.config.xsd_path {
            Some(path) => SchemaResource::from_path(path)?,
            None => SchemaResource::embedded(descriptor),
        };
        let schema = resource.compile()?;
        debug!(
            schema = %schema.origin(),
            duration_ms = start.elapsed().as_millis(),
            "schema ready"
        );
        Ok(schema)
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        let start = Instant::now();
        let loader = open_loader(&self.config.data_path, &self.config.loader_options())?;
        let records = loader.load()?;
        info!(
            source = %loader.describe(),
            records = records.len(),
            duration_ms = start.elapsed().as_millis(),
            "load complete"
        );
        Ok(records)
    }
}

fn record_assembly(report: &mut RunReport, document: &AssembledDocument) {
    report.transaction_count = Some(document.transaction_count);
    report.control_sum = Some(document.control_sum);
    report.warnings.clone_from(&document.warnings);
}
