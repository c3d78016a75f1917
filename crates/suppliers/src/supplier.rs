use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendhub_core::{Aggregate, AggregateId, AggregateRoot, DomainError, UserId};
use vendhub_events::Event;

use crate::address::AddressId;
use crate::commission::{CommissionDefaults, CommissionOverrides, CommissionTerms};

/// Supplier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub AggregateId);

impl SupplierId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Stock location identifier.
///
/// The supplier aggregate tracks its locations by this id; the location
/// aggregate itself lives in `vendhub-inventory`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLocationId(pub AggregateId);

impl StockLocationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StockLocationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Supplier.
///
/// A vendor organization selling through the marketplace. Owns its commission
/// terms, references exactly one address, and tracks the user accounts and
/// stock locations associated with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    email: String,
    address: Option<AddressId>,
    commission: CommissionTerms,
    users: Vec<UserId>,
    stock_locations: Vec<StockLocationId>,
    deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Supplier {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: SupplierId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            address: None,
            commission: CommissionTerms::default(),
            users: Vec::new(),
            stock_locations: Vec::new(),
            deleted_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> Option<AddressId> {
        self.address
    }

    pub fn commission(&self) -> CommissionTerms {
        self.commission
    }

    /// Linked management accounts, in linkage order.
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Stock locations attached to this supplier, first-provisioned first.
    pub fn stock_locations(&self) -> &[StockLocationId] {
        &self.stock_locations
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Soft-delete predicate: true iff `deleted_at` is set.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterSupplier.
///
/// `defaults` is the snapshot of the platform commission defaults read at
/// registration time; the decision logic stays pure while still observing the
/// configuration current at the moment of creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSupplier {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: String,
    pub address: Option<AddressId>,
    pub commission: CommissionOverrides,
    pub defaults: CommissionDefaults,
    /// Explicitly pre-attached management accounts.
    pub users: Vec<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateSupplierDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSupplierDetails {
    pub supplier_id: SupplierId,
    /// Optional new name (if None, keep existing).
    pub name: Option<String>,
    /// Optional new email (if None, keep existing).
    pub email: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetCommission (explicit override update, verbatim values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCommission {
    pub supplier_id: SupplierId,
    pub flat_rate: Decimal,
    pub percentage: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkUser {
    pub supplier_id: SupplierId,
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AttachStockLocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachStockLocation {
    pub supplier_id: SupplierId,
    pub location_id: StockLocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteSupplier (soft delete; the record is never removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSupplier {
    pub supplier_id: SupplierId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierCommand {
    Register(RegisterSupplier),
    UpdateDetails(UpdateSupplierDetails),
    SetCommission(SetCommission),
    LinkUser(LinkUser),
    AttachStockLocation(AttachStockLocation),
    Delete(DeleteSupplier),
}

/// Event: SupplierRegistered.
///
/// Carries the *resolved* commission terms; a registered supplier never has
/// unresolved rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRegistered {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: String,
    pub address: AddressId,
    pub commission: CommissionTerms,
    pub users: Vec<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SupplierDetailsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDetailsUpdated {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CommissionChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionChanged {
    pub supplier_id: SupplierId,
    pub commission: CommissionTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UserLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLinked {
    pub supplier_id: SupplierId,
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockLocationAttached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocationAttached {
    pub supplier_id: SupplierId,
    pub location_id: StockLocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SupplierDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDeleted {
    pub supplier_id: SupplierId,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierEvent {
    SupplierRegistered(SupplierRegistered),
    SupplierDetailsUpdated(SupplierDetailsUpdated),
    CommissionChanged(CommissionChanged),
    UserLinked(UserLinked),
    StockLocationAttached(StockLocationAttached),
    SupplierDeleted(SupplierDeleted),
}

impl Event for SupplierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SupplierEvent::SupplierRegistered(_) => "suppliers.supplier.registered",
            SupplierEvent::SupplierDetailsUpdated(_) => "suppliers.supplier.details_updated",
            SupplierEvent::CommissionChanged(_) => "suppliers.supplier.commission_changed",
            SupplierEvent::UserLinked(_) => "suppliers.supplier.user_linked",
            SupplierEvent::StockLocationAttached(_) => "suppliers.supplier.stock_location_attached",
            SupplierEvent::SupplierDeleted(_) => "suppliers.supplier.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SupplierEvent::SupplierRegistered(e) => e.occurred_at,
            SupplierEvent::SupplierDetailsUpdated(e) => e.occurred_at,
            SupplierEvent::CommissionChanged(e) => e.occurred_at,
            SupplierEvent::UserLinked(e) => e.occurred_at,
            SupplierEvent::StockLocationAttached(e) => e.occurred_at,
            SupplierEvent::SupplierDeleted(e) => e.deleted_at,
        }
    }
}

impl Aggregate for Supplier {
    type Command = SupplierCommand;
    type Event = SupplierEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SupplierEvent::SupplierRegistered(e) => {
                self.id = e.supplier_id;
                self.name = e.name.clone();
                self.email = e.email.clone();
                self.address = Some(e.address);
                self.commission = e.commission;
                self.users = e.users.clone();
                self.stock_locations = Vec::new();
                self.deleted_at = None;
                self.created = true;
            }
            SupplierEvent::SupplierDetailsUpdated(e) => {
                self.name = e.name.clone();
                self.email = e.email.clone();
            }
            SupplierEvent::CommissionChanged(e) => {
                self.commission = e.commission;
            }
            SupplierEvent::UserLinked(e) => {
                if !self.users.contains(&e.user_id) {
                    self.users.push(e.user_id);
                }
            }
            SupplierEvent::StockLocationAttached(e) => {
                if !self.stock_locations.contains(&e.location_id) {
                    self.stock_locations.push(e.location_id);
                }
            }
            SupplierEvent::SupplierDeleted(e) => {
                self.deleted_at = Some(e.deleted_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SupplierCommand::Register(cmd) => self.handle_register(cmd),
            SupplierCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            SupplierCommand::SetCommission(cmd) => self.handle_set_commission(cmd),
            SupplierCommand::LinkUser(cmd) => self.handle_link_user(cmd),
            SupplierCommand::AttachStockLocation(cmd) => self.handle_attach_location(cmd),
            SupplierCommand::Delete(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Supplier {
    fn ensure_supplier_id(&self, supplier_id: SupplierId) -> Result<(), DomainError> {
        if self.id != supplier_id {
            return Err(DomainError::invariant("supplier_id mismatch"));
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(())
    }

    fn validate_email(email: &str) -> Result<(), DomainError> {
        if email.trim().is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterSupplier) -> Result<Vec<SupplierEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("supplier already exists"));
        }

        Self::validate_name(&cmd.name)?;
        Self::validate_email(&cmd.email)?;

        let address = cmd
            .address
            .ok_or_else(|| DomainError::validation("address is required"))?;

        let commission = CommissionTerms::resolve(&cmd.commission, &cmd.defaults);
        if commission.flat_rate < Decimal::ZERO {
            return Err(DomainError::validation(
                "commission flat rate cannot be negative",
            ));
        }

        Ok(vec![SupplierEvent::SupplierRegistered(SupplierRegistered {
            supplier_id: cmd.supplier_id,
            name: cmd.name.clone(),
            email: cmd.email.clone(),
            address,
            commission,
            users: cmd.users.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(
        &self,
        cmd: &UpdateSupplierDetails,
    ) -> Result<Vec<SupplierEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_supplier_id(cmd.supplier_id)?;

        let new_name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
        let new_email = cmd.email.clone().unwrap_or_else(|| self.email.clone());
        Self::validate_name(&new_name)?;
        Self::validate_email(&new_email)?;

        Ok(vec![SupplierEvent::SupplierDetailsUpdated(
            SupplierDetailsUpdated {
                supplier_id: cmd.supplier_id,
                name: new_name,
                email: new_email,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_set_commission(&self, cmd: &SetCommission) -> Result<Vec<SupplierEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_supplier_id(cmd.supplier_id)?;

        if cmd.flat_rate < Decimal::ZERO {
            return Err(DomainError::validation(
                "commission flat rate cannot be negative",
            ));
        }

        Ok(vec![SupplierEvent::CommissionChanged(CommissionChanged {
            supplier_id: cmd.supplier_id,
            commission: CommissionTerms {
                flat_rate: cmd.flat_rate,
                percentage: cmd.percentage,
            },
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_link_user(&self, cmd: &LinkUser) -> Result<Vec<SupplierEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_supplier_id(cmd.supplier_id)?;

        // Linking an already-linked identity is a no-op, not an error:
        // linkage must be safely re-runnable.
        if self.users.contains(&cmd.user_id) {
            return Ok(vec![]);
        }

        Ok(vec![SupplierEvent::UserLinked(UserLinked {
            supplier_id: cmd.supplier_id,
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_attach_location(
        &self,
        cmd: &AttachStockLocation,
    ) -> Result<Vec<SupplierEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_supplier_id(cmd.supplier_id)?;

        if self.stock_locations.contains(&cmd.location_id) {
            return Ok(vec![]);
        }

        Ok(vec![SupplierEvent::StockLocationAttached(
            StockLocationAttached {
                supplier_id: cmd.supplier_id,
                location_id: cmd.location_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_delete(&self, cmd: &DeleteSupplier) -> Result<Vec<SupplierEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_supplier_id(cmd.supplier_id)?;

        if self.is_deleted() {
            return Err(DomainError::conflict("supplier is already deleted"));
        }

        Ok(vec![SupplierEvent::SupplierDeleted(SupplierDeleted {
            supplier_id: cmd.supplier_id,
            deleted_at: cmd.occurred_at,
        })])
    }
}
