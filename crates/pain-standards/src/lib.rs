//! pain.001 revision standards.
//!
//! This crate provides, per supported revision:
//!
//! - a **mapping table**: canonical field → raw column synonyms, default,
//!   and whether the field is mandatory
//! - a **tag layout**: the element path each canonical value is emitted at
//! - the **schema definition** the assembled document is validated against
//!
//! All of it is data under `data/`, embedded at compile time and parsed
//! once into a [`StandardsRegistry`].
//!
//! # Data Directory Structure
//!
//! ```text
//! data/
//! ├── versions.csv             # namespace and envelope elements per revision
//! ├── mappings/                # field,synonyms,default,required,max_length,codes
//! ├── layouts/                 # section,path,source,attributes
//! └── xsd/                     # schema definitions
//! ```

pub mod embedded;
pub mod error;
pub mod layout;
pub mod mapping;
pub mod registry;

// Error types
pub use error::{Result, StandardsError};

// Tables
pub use layout::{AttributeRule, LayoutRule, LayoutSection, TagLayout, ValueSource};
pub use mapping::{DefaultValue, FieldRule, MappingTable};

// Registry
pub use registry::{StandardsRegistry, VersionDescriptor, embedded_registry};
