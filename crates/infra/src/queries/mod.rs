//! Cross-entity read queries.
//!
//! Associations that span modules (supplier → shipments, supplier →
//! catalog) are explicit read-time joins against the persistence ports, not
//! live object-graph traversal.

pub mod catalog;
pub mod shipments;

pub use catalog::{InMemoryCatalogStore, SupplierCatalog};
pub use shipments::{InMemoryShipmentStore, SupplierShipments};
