//! Supplier onboarding orchestration.
//!
//! Registration runs an ordered pipeline over the pure aggregates:
//! validation → commission resolution → user linkage → first stock location
//! provisioning → conditional welcome notification. Validation failures stop
//! the pipeline before anything is appended, so a failed registration leaves
//! no partial state. The post-validation steps are deterministic local
//! computations; there is no retry logic here.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use thiserror::Error;

use vendhub_core::{AggregateId, UserId};
use vendhub_directory::UserDirectory;
use vendhub_events::{EventBus, EventEnvelope};
use vendhub_inventory::{CreateStockLocation, StockLocation, StockLocationCommand};
use vendhub_suppliers::{
    AddressId, AddressStore, AttachStockLocation, CommissionOverrides, DeleteSupplier, LinkUser,
    RegisterSupplier, SetCommission, StockLocationId, Supplier, SupplierCommand, SupplierId,
    UpdateSupplierDetails,
};

use crate::command_dispatcher::{CommandDispatcher, DispatchError};
use crate::config::SettingsProvider;
use crate::event_store::EventStore;
use crate::notifications::NotificationGateway;

/// Stream type for supplier aggregates.
pub const SUPPLIER_AGGREGATE: &str = "suppliers.supplier";
/// Stream type for stock location aggregates.
pub const STOCK_LOCATION_AGGREGATE: &str = "inventory.stock_location";

#[derive(Debug, Error)]
pub enum OnboardingError {
    /// A required field is missing/blank or a reference does not resolve.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("supplier not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    /// First provisioning ran against a supplier that already has stock
    /// locations. An orchestration bug, not a user-facing error.
    #[error("stock locations already present before first provisioning of supplier {0}")]
    ProvisioningPrecondition(SupplierId),

    #[error("dispatch failed: {0:?}")]
    Dispatch(DispatchError),
}

impl From<DispatchError> for OnboardingError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Validation(msg) => OnboardingError::Validation(msg),
            DispatchError::NotFound => OnboardingError::NotFound,
            DispatchError::Concurrency(msg) => OnboardingError::Conflict(msg),
            other => OnboardingError::Dispatch(other),
        }
    }
}

/// Input for registering a new supplier.
#[derive(Debug, Clone)]
pub struct SupplierRegistration {
    pub name: String,
    pub email: String,
    pub address: Option<AddressId>,
    pub commission: CommissionOverrides,
    /// Explicitly pre-attached management accounts. When non-empty, the
    /// directory is not consulted for this save.
    pub users: Vec<UserId>,
}

impl SupplierRegistration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: AddressId,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: Some(address),
            commission: CommissionOverrides::none(),
            users: Vec::new(),
        }
    }
}

/// Application service for the supplier lifecycle.
///
/// Composes the command dispatcher with the boundary ports (settings,
/// directory, address book, notifications) and owns the ordered creation
/// pipeline.
pub struct SupplierOnboarding<S, B> {
    store: Arc<S>,
    dispatcher: CommandDispatcher<Arc<S>, Arc<B>>,
    settings: Arc<dyn SettingsProvider>,
    directory: Arc<dyn UserDirectory>,
    addresses: Arc<dyn AddressStore>,
    notifications: Arc<dyn NotificationGateway>,
}

impl<S, B> SupplierOnboarding<S, B>
where
    S: EventStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(
        store: Arc<S>,
        bus: Arc<B>,
        settings: Arc<dyn SettingsProvider>,
        directory: Arc<dyn UserDirectory>,
        addresses: Arc<dyn AddressStore>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            store: store.clone(),
            dispatcher: CommandDispatcher::new(store, bus),
            settings,
            directory,
            addresses,
            notifications,
        }
    }

    /// Register a supplier and run the post-validation pipeline.
    ///
    /// Returns the new supplier's id. A validation error (blank name/email,
    /// absent or unresolvable address) means nothing was created: no events,
    /// no stock location, no notification.
    pub fn register(
        &self,
        registration: SupplierRegistration,
    ) -> Result<SupplierId, OnboardingError> {
        let supplier_id = SupplierId::new(AggregateId::new());

        // Cross-entity validation: the address reference must resolve before
        // anything is appended.
        let address = registration
            .address
            .ok_or_else(|| OnboardingError::Validation("address is required".to_string()))?;
        let country = self
            .addresses
            .country_of(address)
            .ok_or_else(|| OnboardingError::Validation(format!("unknown address: {address}")))?;

        // Commission defaults snapshot, read at creation time (never cached
        // across registrations).
        let defaults = self.settings.commission_defaults();

        let explicit_users = !registration.users.is_empty();
        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::Register(RegisterSupplier {
                supplier_id,
                name: registration.name,
                email: registration.email,
                address: Some(address),
                commission: registration.commission,
                defaults,
                users: registration.users,
                occurred_at: Utc::now(),
            }),
        )?;

        tracing::info!(%supplier_id, "supplier registered");

        // Explicit attachment takes precedence over the implicit lookup.
        if !explicit_users {
            self.link_users(supplier_id)?;
        }

        self.provision_first_location(supplier_id, &country)?;

        // The flag is read at send-decision time, not from the snapshot
        // taken above.
        if self.settings.send_supplier_email() {
            self.notifications.send_welcome(supplier_id);
        }

        Ok(supplier_id)
    }

    /// Attach the management account matching the supplier's email, unless
    /// one is already linked.
    ///
    /// Safe to re-run: a supplier with a non-empty user set is left untouched
    /// and the directory is not queried. An account that the directory does
    /// not know stays unlinked; creating one is the directory flow's
    /// decision, not ours.
    pub fn link_users(&self, supplier_id: SupplierId) -> Result<(), OnboardingError> {
        let supplier = self
            .load_supplier(supplier_id)?
            .ok_or(OnboardingError::NotFound)?;

        if !supplier.users().is_empty() || supplier.email().is_empty() {
            return Ok(());
        }

        let Some(account) = self.directory.find_by_email(supplier.email()) else {
            return Ok(());
        };

        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::LinkUser(LinkUser {
                supplier_id,
                user_id: account.id,
                occurred_at: Utc::now(),
            }),
        )?;

        tracing::debug!(%supplier_id, user_id = %account.id, "linked existing account by email");

        Ok(())
    }

    /// Provision the supplier's first stock location.
    ///
    /// Runs exactly once, from `register`. Precondition: the supplier has no
    /// stock locations yet; a violation means the orchestration itself
    /// misfired and is reported loudly rather than repaired.
    pub(crate) fn provision_first_location(
        &self,
        supplier_id: SupplierId,
        country: &str,
    ) -> Result<StockLocationId, OnboardingError> {
        let supplier = self
            .load_supplier(supplier_id)?
            .ok_or(OnboardingError::NotFound)?;

        if !supplier.stock_locations().is_empty() {
            tracing::error!(
                %supplier_id,
                locations = supplier.stock_locations().len(),
                "first provisioning requested but stock locations already exist"
            );
            return Err(OnboardingError::ProvisioningPrecondition(supplier_id));
        }

        // The first location is always active and inherits the supplier's
        // address country.
        self.create_and_attach_location(
            &supplier,
            supplier.name().to_string(),
            country.to_string(),
            true,
        )
    }

    /// Add a further stock location to an existing supplier.
    pub fn add_stock_location(
        &self,
        supplier_id: SupplierId,
        name: impl Into<String>,
        active: bool,
    ) -> Result<StockLocationId, OnboardingError> {
        let supplier = self
            .load_supplier(supplier_id)?
            .ok_or(OnboardingError::NotFound)?;
        let address = supplier.address().ok_or(OnboardingError::NotFound)?;
        let country = self
            .addresses
            .country_of(address)
            .ok_or_else(|| OnboardingError::Validation(format!("unknown address: {address}")))?;

        self.create_and_attach_location(&supplier, name.into(), country, active)
    }

    /// Update name and/or email.
    ///
    /// An email change re-runs user linkage, which is a no-op for suppliers
    /// that already have linked accounts.
    pub fn update_details(
        &self,
        supplier_id: SupplierId,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<(), OnboardingError> {
        let email_changed = email.is_some();

        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::UpdateDetails(UpdateSupplierDetails {
                supplier_id,
                name,
                email,
                occurred_at: Utc::now(),
            }),
        )?;

        if email_changed {
            self.link_users(supplier_id)?;
        }

        Ok(())
    }

    /// Override the commission rates, verbatim.
    pub fn set_commission(
        &self,
        supplier_id: SupplierId,
        flat_rate: Decimal,
        percentage: Decimal,
    ) -> Result<(), OnboardingError> {
        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::SetCommission(SetCommission {
                supplier_id,
                flat_rate,
                percentage,
                occurred_at: Utc::now(),
            }),
        )?;

        Ok(())
    }

    /// Soft-delete the supplier (the record is never physically removed).
    pub fn delete(&self, supplier_id: SupplierId) -> Result<(), OnboardingError> {
        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::Delete(DeleteSupplier {
                supplier_id,
                occurred_at: Utc::now(),
            }),
        )?;

        tracing::info!(%supplier_id, "supplier soft-deleted");

        Ok(())
    }

    /// Rehydrate a supplier from its stream.
    pub fn supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, OnboardingError> {
        self.load_supplier(supplier_id)
    }

    /// Rehydrate a stock location from its stream.
    pub fn stock_location(
        &self,
        location_id: StockLocationId,
    ) -> Result<Option<StockLocation>, OnboardingError> {
        let history = self
            .store
            .load_stream(location_id.0)
            .map_err(DispatchError::from)?;
        if history.is_empty() {
            return Ok(None);
        }

        let mut location = StockLocation::empty(location_id);
        apply_stream(&mut location, history)?;
        Ok(Some(location))
    }

    fn create_and_attach_location(
        &self,
        supplier: &Supplier,
        name: String,
        country: String,
        active: bool,
    ) -> Result<StockLocationId, OnboardingError> {
        let location_id = StockLocationId::new(AggregateId::new());
        let supplier_id = supplier.id_typed();

        self.dispatcher.dispatch(
            location_id.0,
            STOCK_LOCATION_AGGREGATE,
            StockLocationCommand::Create(CreateStockLocation {
                location_id,
                supplier_id,
                name,
                country,
                active,
                occurred_at: Utc::now(),
            }),
            |id| StockLocation::empty(StockLocationId::new(id)),
        )?;

        self.dispatch_supplier(
            supplier_id,
            SupplierCommand::AttachStockLocation(AttachStockLocation {
                supplier_id,
                location_id,
                occurred_at: Utc::now(),
            }),
        )?;

        tracing::debug!(%supplier_id, %location_id, "stock location provisioned");

        Ok(location_id)
    }

    fn dispatch_supplier(
        &self,
        supplier_id: SupplierId,
        command: SupplierCommand,
    ) -> Result<(), OnboardingError> {
        self.dispatcher.dispatch(supplier_id.0, SUPPLIER_AGGREGATE, command, |id| {
            Supplier::empty(SupplierId::new(id))
        })?;

        Ok(())
    }

    fn load_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Option<Supplier>, OnboardingError> {
        let history = self
            .store
            .load_stream(supplier_id.0)
            .map_err(DispatchError::from)?;
        if history.is_empty() {
            return Ok(None);
        }

        let mut supplier = Supplier::empty(supplier_id);
        apply_stream(&mut supplier, history)?;
        Ok(Some(supplier))
    }
}

fn apply_stream<A>(
    aggregate: &mut A,
    mut history: Vec<crate::event_store::StoredEvent>,
) -> Result<(), OnboardingError>
where
    A: vendhub_core::Aggregate,
    A::Event: serde::de::DeserializeOwned,
{
    history.sort_by_key(|e| e.sequence_number);

    for stored in history {
        let event: A::Event = serde_json::from_value(stored.payload)
            .map_err(|e| OnboardingError::Dispatch(DispatchError::Deserialize(e.to_string())))?;
        aggregate.apply(&event);
    }

    Ok(())
}
