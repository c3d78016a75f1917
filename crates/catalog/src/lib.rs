//! Catalog records: products, variants, and the supplier-variant join.
//!
//! Read-only from the supplier core's perspective; the catalog service owns
//! the write path. Supplier → products is always reached through variants by
//! explicit joins, never by object-graph traversal.

pub mod catalog;

pub use catalog::{CatalogStore, Product, ProductId, SupplierVariant, Variant, VariantId};
