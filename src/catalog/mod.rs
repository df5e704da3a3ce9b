//! Dremio catalog module
//!
//! Registers each stream as a catalog source and each message type as a
//! physical Parquet dataset under it, so a freshly written file is
//! immediately queryable. Registration is idempotent: existing entities are
//! detected and left alone, and a conflicting create counts as success.

mod client;
mod reconcile;

pub use client::DremioClient;
pub use reconcile::{CatalogRegistry, DremioCatalog};

#[cfg(test)]
mod tests;
