use std::sync::RwLock;

use vendhub_shipping::{Shipment, ShipmentStore};
use vendhub_suppliers::{StockLocationId, Supplier};

/// Read-time aggregation: all shipments across a supplier's stock locations.
#[derive(Debug)]
pub struct SupplierShipments<S>
where
    S: ShipmentStore,
{
    shipments: S,
}

impl<S> SupplierShipments<S>
where
    S: ShipmentStore,
{
    pub fn new(shipments: S) -> Self {
        Self { shipments }
    }

    /// Union of shipments whose stock location belongs to the supplier.
    ///
    /// Covers every location currently attached, not just the first
    /// provisioned one. No ordering guarantee; duplicates cannot occur since
    /// a shipment has exactly one stock location.
    pub fn shipments_for(&self, supplier: &Supplier) -> Vec<Shipment> {
        supplier
            .stock_locations()
            .iter()
            .flat_map(|location| self.shipments.by_stock_location(*location))
            .collect()
    }
}

/// In-memory shipment store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryShipmentStore {
    inner: RwLock<Vec<Shipment>>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShipmentStore for InMemoryShipmentStore {
    fn insert(&self, shipment: Shipment) {
        if let Ok(mut shipments) = self.inner.write() {
            shipments.retain(|s| s.id != shipment.id);
            shipments.push(shipment);
        }
    }

    fn by_stock_location(&self, location: StockLocationId) -> Vec<Shipment> {
        let shipments = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        shipments
            .iter()
            .filter(|s| s.stock_location == location)
            .cloned()
            .collect()
    }

    fn list(&self) -> Vec<Shipment> {
        self.inner.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_core::AggregateId;
    use vendhub_shipping::ShipmentId;

    fn shipment(number: &str, location: StockLocationId) -> Shipment {
        Shipment {
            id: ShipmentId::new(AggregateId::new()),
            number: number.to_string(),
            stock_location: location,
            shipped_at: None,
        }
    }

    #[test]
    fn by_stock_location_filters_exactly() {
        let store = InMemoryShipmentStore::new();
        let here = StockLocationId::new(AggregateId::new());
        let elsewhere = StockLocationId::new(AggregateId::new());

        store.insert(shipment("S1", here));
        store.insert(shipment("S2", elsewhere));
        store.insert(shipment("S3", here));

        let found = store.by_stock_location(here);
        let mut numbers: Vec<_> = found.iter().map(|s| s.number.as_str()).collect();
        numbers.sort();
        assert_eq!(numbers, vec!["S1", "S3"]);
    }
}
