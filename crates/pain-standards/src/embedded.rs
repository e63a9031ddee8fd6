//! Embedded standards data.
//!
//! Mapping tables, tag layouts and schema definitions are compiled in with
//! `include_str!()`. Adding a revision means adding one row to
//! `versions.csv`, its three files, and one arm in [`version_files`].

use pain_model::SchemaVersion;

/// Revision catalog: namespace and envelope element names.
pub const VERSIONS: &str = include_str!("../data/versions.csv");

// =============================================================================
// pain.001.001.03
// =============================================================================

pub const MAPPING_V03: &str = include_str!("../data/mappings/pain.001.001.03.csv");
pub const LAYOUT_V03: &str = include_str!("../data/layouts/pain.001.001.03.csv");
pub const SCHEMA_V03: &str = include_str!("../data/xsd/pain.001.001.03.xsd");

// =============================================================================
// pain.001.001.04
// =============================================================================

pub const MAPPING_V04: &str = include_str!("../data/mappings/pain.001.001.04.csv");
pub const LAYOUT_V04: &str = include_str!("../data/layouts/pain.001.001.04.csv");
pub const SCHEMA_V04: &str = include_str!("../data/xsd/pain.001.001.04.xsd");

// =============================================================================
// pain.001.001.09
// =============================================================================

pub const MAPPING_V09: &str = include_str!("../data/mappings/pain.001.001.09.csv");
pub const LAYOUT_V09: &str = include_str!("../data/layouts/pain.001.001.09.csv");
pub const SCHEMA_V09: &str = include_str!("../data/xsd/pain.001.001.09.xsd");

/// Embedded files for one revision.
#[derive(Debug, Clone, Copy)]
pub struct VersionFiles {
    pub mapping: &'static str,
    pub layout: &'static str,
    pub schema: &'static str,
}

pub fn version_files(version: SchemaVersion) -> VersionFiles {
    match version {
        SchemaVersion::V03 => VersionFiles {
            mapping: MAPPING_V03,
            layout: LAYOUT_V03,
            schema: SCHEMA_V03,
        },
        SchemaVersion::V04 => VersionFiles {
            mapping: MAPPING_V04,
            layout: LAYOUT_V04,
            schema: SCHEMA_V04,
        },
        SchemaVersion::V09 => VersionFiles {
            mapping: MAPPING_V09,
            layout: LAYOUT_V09,
            schema: SCHEMA_V09,
        },
    }
}
