//! Shipments: fulfilment records owned by the logistics side of the
//! platform. This core only reads them, through the `ShipmentStore` port.

pub mod shipment;

pub use shipment::{Shipment, ShipmentId, ShipmentStore};
