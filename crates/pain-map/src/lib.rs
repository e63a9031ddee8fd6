//! Field normalizer and mapper.
//!
//! One generic routine resolves every canonical field through the active
//! revision's [`MappingTable`](pain_standards::MappingTable): the first
//! non-blank synonym wins, then the table default, otherwise the field is
//! unresolved. Mapping is pure; the same records and revision always give
//! the same canonical output.

mod error;
mod mapper;
mod normalize;

pub use error::{MappingError, MappingIssue, Result};
pub use mapper::{FieldMapper, MappedBatch};
pub use normalize::{normalize_amount, normalize_value};
