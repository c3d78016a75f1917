use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendhub_core::{AggregateId, Entity};
use vendhub_suppliers::StockLocationId;

/// Shipment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(pub AggregateId);

impl ShipmentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A shipment leaving one stock location.
///
/// Each shipment references exactly one stock location, which is what makes
/// the per-supplier aggregation duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    /// Human-facing shipment number.
    pub number: String,
    pub stock_location: StockLocationId,
    pub shipped_at: Option<DateTime<Utc>>,
}

impl Entity for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Persistence boundary for shipments.
///
/// Writes happen on the logistics side; this core queries by stock location.
pub trait ShipmentStore: Send + Sync {
    fn insert(&self, shipment: Shipment);

    fn by_stock_location(&self, location: StockLocationId) -> Vec<Shipment>;

    fn list(&self) -> Vec<Shipment>;
}

impl<S> ShipmentStore for Arc<S>
where
    S: ShipmentStore + ?Sized,
{
    fn insert(&self, shipment: Shipment) {
        (**self).insert(shipment)
    }

    fn by_stock_location(&self, location: StockLocationId) -> Vec<Shipment> {
        (**self).by_stock_location(location)
    }

    fn list(&self) -> Vec<Shipment> {
        (**self).list()
    }
}
