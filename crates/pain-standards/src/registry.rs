//! Revision descriptors and the registry that owns them.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::OnceLock;

use serde::Deserialize;

use pain_model::SchemaVersion;

use crate::embedded;
use crate::error::{Result, StandardsError};
use crate::layout::TagLayout;
use crate::mapping::MappingTable;

/// Everything that is specific to one pain.001 revision.
#[derive(Debug, Clone)]
pub struct VersionDescriptor {
    pub version: SchemaVersion,
    pub namespace: String,
    /// Child of `Document`, e.g. `CstmrCdtTrfInitn`.
    pub message_element: String,
    pub batch_element: String,
    pub transaction_element: String,
    pub mapping: MappingTable,
    pub layout: TagLayout,
    /// Embedded schema definition text.
    pub schema: &'static str,
}

impl VersionDescriptor {
    pub fn schema_name(&self) -> String {
        format!("{}.xsd", self.version.message_type())
    }
}

#[derive(Debug, Deserialize)]
struct VersionCsvRow {
    version: String,
    namespace: String,
    message_element: String,
    batch_element: String,
    transaction_element: String,
}

/// Immutable set of revision descriptors, built once at startup.
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    descriptors: BTreeMap<SchemaVersion, VersionDescriptor>,
}

impl StandardsRegistry {
    /// Parses every embedded table.
    pub fn load() -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(embedded::VERSIONS.as_bytes()));

        let mut descriptors = BTreeMap::new();
        for result in reader.deserialize::<VersionCsvRow>() {
            let row = result.map_err(|e| StandardsError::CsvParse {
                file: "versions.csv".to_string(),
                message: e.to_string(),
            })?;
            let version: SchemaVersion =
                row.version.parse().map_err(|_| StandardsError::InvalidValue {
                    field: "version",
                    value: row.version.clone(),
                    file: "versions.csv".to_string(),
                })?;

            let files = embedded::version_files(version);
            let message_type = version.message_type();
            let descriptor = VersionDescriptor {
                version,
                namespace: row.namespace,
                message_element: row.message_element,
                batch_element: row.batch_element,
                transaction_element: row.transaction_element,
                mapping: MappingTable::from_csv(
                    files.mapping,
                    &format!("mappings/{message_type}.csv"),
                )?,
                layout: TagLayout::from_csv(files.layout, &format!("layouts/{message_type}.csv"))?,
                schema: files.schema,
            };
            descriptors.insert(version, descriptor);
        }

        for version in SchemaVersion::ALL {
            if !descriptors.contains_key(&version) {
                return Err(StandardsError::MissingVersion { version });
            }
        }
        Ok(Self { descriptors })
    }

    pub fn descriptor(&self, version: SchemaVersion) -> Result<&VersionDescriptor> {
        self.descriptors
            .get(&version)
            .ok_or(StandardsError::MissingVersion { version })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &VersionDescriptor> {
        self.descriptors.values()
    }
}

static EMBEDDED: OnceLock<StandardsRegistry> = OnceLock::new();

/// Process-wide registry over the embedded data, parsed on first use.
pub fn embedded_registry() -> Result<&'static StandardsRegistry> {
    if let Some(registry) = EMBEDDED.get() {
        return Ok(registry);
    }
    let loaded = StandardsRegistry::load()?;
    Ok(EMBEDDED.get_or_init(|| loaded))
}
