use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendhub_core::{Aggregate, AggregateRoot, DomainError};
use vendhub_events::Event;
use vendhub_suppliers::{StockLocationId, SupplierId};

/// Aggregate root: StockLocation.
///
/// An inventory site belonging to exactly one supplier. The first location a
/// supplier gets is provisioned automatically at registration and is always
/// active; its country is copied from the supplier's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLocation {
    id: StockLocationId,
    supplier: Option<SupplierId>,
    name: String,
    /// ISO 3166-1 alpha-2 code.
    country: String,
    active: bool,
    version: u64,
    created: bool,
}

impl StockLocation {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: StockLocationId) -> Self {
        Self {
            id,
            supplier: None,
            name: String::new(),
            country: String::new(),
            active: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> StockLocationId {
        self.id
    }

    /// Back-reference to the owning supplier.
    pub fn supplier(&self) -> Option<SupplierId> {
        self.supplier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl AggregateRoot for StockLocation {
    type Id = StockLocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateStockLocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStockLocation {
    pub location_id: StockLocationId,
    pub supplier_id: SupplierId,
    pub name: String,
    pub country: String,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetLocationActive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLocationActive {
    pub location_id: StockLocationId,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLocationCommand {
    Create(CreateStockLocation),
    SetActive(SetLocationActive),
}

/// Event: StockLocationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocationCreated {
    pub location_id: StockLocationId,
    pub supplier_id: SupplierId,
    pub name: String,
    pub country: String,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LocationActivationChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationActivationChanged {
    pub location_id: StockLocationId,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLocationEvent {
    StockLocationCreated(StockLocationCreated),
    LocationActivationChanged(LocationActivationChanged),
}

impl Event for StockLocationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockLocationEvent::StockLocationCreated(_) => "inventory.stock_location.created",
            StockLocationEvent::LocationActivationChanged(_) => {
                "inventory.stock_location.activation_changed"
            }
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockLocationEvent::StockLocationCreated(e) => e.occurred_at,
            StockLocationEvent::LocationActivationChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockLocation {
    type Command = StockLocationCommand;
    type Event = StockLocationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockLocationEvent::StockLocationCreated(e) => {
                self.id = e.location_id;
                self.supplier = Some(e.supplier_id);
                self.name = e.name.clone();
                self.country = e.country.clone();
                self.active = e.active;
                self.created = true;
            }
            StockLocationEvent::LocationActivationChanged(e) => {
                self.active = e.active;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockLocationCommand::Create(cmd) => self.handle_create(cmd),
            StockLocationCommand::SetActive(cmd) => self.handle_set_active(cmd),
        }
    }
}

impl StockLocation {
    fn ensure_location_id(&self, location_id: StockLocationId) -> Result<(), DomainError> {
        if self.id != location_id {
            return Err(DomainError::invariant("location_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreateStockLocation,
    ) -> Result<Vec<StockLocationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("stock location already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.country.trim().is_empty() {
            return Err(DomainError::validation("country cannot be empty"));
        }

        Ok(vec![StockLocationEvent::StockLocationCreated(
            StockLocationCreated {
                location_id: cmd.location_id,
                supplier_id: cmd.supplier_id,
                name: cmd.name.clone(),
                country: cmd.country.clone(),
                active: cmd.active,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_set_active(
        &self,
        cmd: &SetLocationActive,
    ) -> Result<Vec<StockLocationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_location_id(cmd.location_id)?;

        if self.active == cmd.active {
            return Ok(vec![]);
        }

        Ok(vec![StockLocationEvent::LocationActivationChanged(
            LocationActivationChanged {
                location_id: cmd.location_id,
                active: cmd.active,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_core::AggregateId;

    fn test_location_id() -> StockLocationId {
        StockLocationId::new(AggregateId::new())
    }

    fn test_supplier_id() -> SupplierId {
        SupplierId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn create_records_supplier_country_and_active_flag() {
        let location_id = test_location_id();
        let supplier_id = test_supplier_id();
        let mut location = StockLocation::empty(location_id);

        let cmd = CreateStockLocation {
            location_id,
            supplier_id,
            name: "Acme Wholesale".to_string(),
            country: "DE".to_string(),
            active: true,
            occurred_at: test_time(),
        };
        let events = location
            .handle(&StockLocationCommand::Create(cmd))
            .unwrap();
        assert_eq!(events.len(), 1);
        location.apply(&events[0]);

        assert_eq!(location.supplier(), Some(supplier_id));
        assert_eq!(location.country(), "DE");
        assert!(location.is_active());
    }

    #[test]
    fn create_rejects_blank_country() {
        let location_id = test_location_id();
        let location = StockLocation::empty(location_id);

        let cmd = CreateStockLocation {
            location_id,
            supplier_id: test_supplier_id(),
            name: "Main".to_string(),
            country: " ".to_string(),
            active: true,
            occurred_at: test_time(),
        };

        let err = location
            .handle(&StockLocationCommand::Create(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_duplicate_creation() {
        let location_id = test_location_id();
        let mut location = StockLocation::empty(location_id);

        let cmd = CreateStockLocation {
            location_id,
            supplier_id: test_supplier_id(),
            name: "Main".to_string(),
            country: "US".to_string(),
            active: true,
            occurred_at: test_time(),
        };
        let events = location
            .handle(&StockLocationCommand::Create(cmd.clone()))
            .unwrap();
        location.apply(&events[0]);

        let err = location
            .handle(&StockLocationCommand::Create(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn set_active_toggles_and_is_idempotent() {
        let location_id = test_location_id();
        let mut location = StockLocation::empty(location_id);

        let cmd = CreateStockLocation {
            location_id,
            supplier_id: test_supplier_id(),
            name: "Main".to_string(),
            country: "US".to_string(),
            active: true,
            occurred_at: test_time(),
        };
        let events = location
            .handle(&StockLocationCommand::Create(cmd))
            .unwrap();
        location.apply(&events[0]);

        // Same flag again: accepted, no events.
        let noop = location
            .handle(&StockLocationCommand::SetActive(SetLocationActive {
                location_id,
                active: true,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(noop.is_empty());

        let events = location
            .handle(&StockLocationCommand::SetActive(SetLocationActive {
                location_id,
                active: false,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);
        location.apply(&events[0]);
        assert!(!location.is_active());
    }

    #[test]
    fn set_active_on_unknown_location_is_not_found() {
        let location = StockLocation::empty(test_location_id());
        let err = location
            .handle(&StockLocationCommand::SetActive(SetLocationActive {
                location_id: location.id_typed(),
                active: false,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }
}
