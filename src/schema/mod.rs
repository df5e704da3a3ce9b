//! Schema inference module
//!
//! Derives a Parquet schema descriptor from an arbitrarily nested JSON
//! payload by recursive descent over the value tree.
//!
//! # Rules
//!
//! - Nulls, empty objects and empty arrays are omitted from the schema
//! - Nested objects become nested groups
//! - Arrays become LIST groups with a single child named `element`
//! - Scalars map to Parquet physical types
//! - Every emitted node has repetition REQUIRED

mod inference;
mod types;

pub use inference::infer;
pub use types::{PhysicalType, SchemaNode};
