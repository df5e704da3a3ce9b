//! Parquet output module
//!
//! Encodes a single JSON payload against an inferred schema descriptor into
//! an in-memory Parquet blob: one row group, one record, stream-configured
//! compression.

mod encoder;

pub use encoder::{compression_for, encode};
