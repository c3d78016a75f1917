//! Integration tests for the supplier lifecycle pipeline.
//!
//! Tests: registration → commission resolution → user linkage → stock
//! location provisioning → notification decision, plus the read-side
//! queries, against the in-memory store/bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;
    use serde_json::Value as JsonValue;

    use vendhub_core::{AggregateId, UserId};
    use vendhub_directory::{UserAccount, UserDirectory};
    use vendhub_events::{EventBus, EventEnvelope, InMemoryEventBus};
    use vendhub_shipping::{Shipment, ShipmentId, ShipmentStore};
    use vendhub_suppliers::{Address, AddressId, CommissionOverrides, StockLocationId};

    use crate::config::MarketplaceSettings;
    use crate::directory::{InMemoryAddressStore, InMemoryUserDirectory};
    use crate::event_store::InMemoryEventStore;
    use crate::notifications::RecordingNotificationGateway;
    use crate::onboarding::{OnboardingError, SupplierOnboarding, SupplierRegistration};
    use crate::projections::SupplierDirectoryProjection;
    use crate::queries::{InMemoryShipmentStore, SupplierShipments};
    use crate::read_model::InMemoryReadStore;

    /// Directory wrapper that counts lookups.
    #[derive(Default)]
    struct CountingDirectory {
        inner: InMemoryUserDirectory,
        lookups: AtomicUsize,
    }

    impl CountingDirectory {
        fn new() -> Self {
            Self::default()
        }

        fn insert(&self, account: UserAccount) {
            self.inner.insert(account);
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl UserDirectory for CountingDirectory {
        fn find_by_email(&self, email: &str) -> Option<UserAccount> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_email(email)
        }
    }

    type Bus = InMemoryEventBus<EventEnvelope<JsonValue>>;

    struct Harness {
        onboarding: SupplierOnboarding<InMemoryEventStore, Bus>,
        bus: Arc<Bus>,
        settings: Arc<MarketplaceSettings>,
        directory: Arc<CountingDirectory>,
        addresses: Arc<InMemoryAddressStore>,
        gateway: Arc<RecordingNotificationGateway>,
        shipments: Arc<InMemoryShipmentStore>,
    }

    fn setup() -> Harness {
        let store = Arc::new(InMemoryEventStore::new());
        let bus: Arc<Bus> = Arc::new(InMemoryEventBus::new());
        let settings = Arc::new(MarketplaceSettings::new());
        let directory = Arc::new(CountingDirectory::new());
        let addresses = Arc::new(InMemoryAddressStore::new());
        let gateway = Arc::new(RecordingNotificationGateway::new());

        let onboarding = SupplierOnboarding::new(
            store,
            bus.clone(),
            settings.clone(),
            directory.clone(),
            addresses.clone(),
            gateway.clone(),
        );

        Harness {
            onboarding,
            bus,
            settings,
            directory,
            addresses,
            gateway,
            shipments: Arc::new(InMemoryShipmentStore::new()),
        }
    }

    fn seed_address(harness: &Harness, country: &str) -> AddressId {
        let id = AddressId::new(AggregateId::new());
        harness.addresses.insert(Address {
            id,
            line1: "12 Dock Road".to_string(),
            city: "Rotterdam".to_string(),
            country: country.to_string(),
        });
        id
    }

    fn registration(harness: &Harness, email: &str, country: &str) -> SupplierRegistration {
        SupplierRegistration::new("Acme Wholesale", email, seed_address(harness, country))
    }

    fn shipment(number: &str, location: StockLocationId) -> Shipment {
        Shipment {
            id: ShipmentId::new(AggregateId::new()),
            number: number.to_string(),
            stock_location: location,
            shipped_at: None,
        }
    }

    #[test]
    fn registration_provisions_one_active_location_in_address_country() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.stock_locations().len(), 1);

        let location_id = supplier.stock_locations()[0];
        let location = harness
            .onboarding
            .stock_location(location_id)
            .unwrap()
            .unwrap();
        assert!(location.is_active());
        assert_eq!(location.country(), "NL");
        assert_eq!(location.supplier(), Some(supplier_id));
    }

    #[test]
    fn registration_resolves_commission_from_current_defaults() {
        let harness = setup();

        harness.settings.set_default_commission_flat_rate(dec!(1));
        harness.settings.set_default_commission_percentage(dec!(1));

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();

        // Later default changes must not touch already-registered suppliers.
        harness.settings.set_default_commission_flat_rate(dec!(0));
        harness.settings.set_default_commission_percentage(dec!(0));

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.commission().flat_rate, dec!(1.0));
        assert_eq!(supplier.commission().percentage, dec!(10.0));

        let mut custom = registration(&harness, "other@acme.test", "NL");
        custom.commission = CommissionOverrides {
            flat_rate: Some(dec!(123)),
            percentage: Some(dec!(25)),
        };
        let custom_id = harness.onboarding.register(custom).unwrap();

        let supplier = harness.onboarding.supplier(custom_id).unwrap().unwrap();
        assert_eq!(supplier.commission().flat_rate, dec!(123.0));
        assert_eq!(supplier.commission().percentage, dec!(25.0));
    }

    #[test]
    fn registration_links_existing_account_and_queries_directory_once() {
        let harness = setup();
        let account = UserAccount::new(UserId::new(), "owner@acme.test", "Owner");
        harness.directory.insert(account.clone());

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "owner@acme.test", "NL"))
            .unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.users(), &[account.id]);
        assert_eq!(harness.directory.lookups(), 1);
    }

    #[test]
    fn pre_attached_user_skips_directory_lookup() {
        let harness = setup();
        let user = UserId::new();

        let mut reg = registration(&harness, "owner@acme.test", "NL");
        reg.users = vec![user];
        let supplier_id = harness.onboarding.register(reg).unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.users(), &[user]);
        assert_eq!(harness.directory.lookups(), 0);
    }

    #[test]
    fn unknown_email_leaves_users_empty() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "nobody@acme.test", "NL"))
            .unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert!(supplier.users().is_empty());
        assert_eq!(harness.directory.lookups(), 1);
    }

    #[test]
    fn relinking_is_a_noop_and_does_not_requery() {
        let harness = setup();
        let account = UserAccount::new(UserId::new(), "owner@acme.test", "Owner");
        harness.directory.insert(account.clone());

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "owner@acme.test", "NL"))
            .unwrap();
        assert_eq!(harness.directory.lookups(), 1);

        harness.onboarding.link_users(supplier_id).unwrap();
        harness.onboarding.link_users(supplier_id).unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.users(), &[account.id]);
        assert_eq!(harness.directory.lookups(), 1);
    }

    #[test]
    fn email_change_triggers_relinking() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "old@acme.test", "NL"))
            .unwrap();
        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert!(supplier.users().is_empty());

        let account = UserAccount::new(UserId::new(), "new@acme.test", "Owner");
        harness.directory.insert(account.clone());

        harness
            .onboarding
            .update_details(supplier_id, None, Some("new@acme.test".to_string()))
            .unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.users(), &[account.id]);
    }

    #[test]
    fn welcome_notification_respects_runtime_flag() {
        let harness = setup();

        harness.settings.set_send_supplier_email(false);
        harness
            .onboarding
            .register(registration(&harness, "quiet@acme.test", "NL"))
            .unwrap();
        assert!(harness.gateway.sent().is_empty());

        harness.settings.set_send_supplier_email(true);
        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "loud@acme.test", "NL"))
            .unwrap();
        assert_eq!(harness.gateway.sent(), vec![supplier_id]);
    }

    #[test]
    fn failed_validation_creates_nothing() {
        let harness = setup();

        let mut reg = registration(&harness, "vendor@acme.test", "NL");
        reg.name = "  ".to_string();
        let err = harness.onboarding.register(reg).unwrap_err();
        assert!(matches!(err, OnboardingError::Validation(_)));

        // Address that the address book does not know.
        let mut reg = registration(&harness, "vendor@acme.test", "NL");
        reg.address = Some(AddressId::new(AggregateId::new()));
        let err = harness.onboarding.register(reg).unwrap_err();
        assert!(matches!(err, OnboardingError::Validation(_)));

        // No partial side effects: no notification went out, and the
        // directory was never consulted.
        assert!(harness.gateway.sent().is_empty());
        assert_eq!(harness.directory.lookups(), 0);
    }

    #[test]
    fn first_provisioning_twice_is_a_loud_error() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();

        let err = harness
            .onboarding
            .provision_first_location(supplier_id, "NL")
            .unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::ProvisioningPrecondition(id) if id == supplier_id
        ));

        // The misfire must not have added a second location.
        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert_eq!(supplier.stock_locations().len(), 1);
    }

    #[test]
    fn shipments_span_all_supplier_locations() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();
        let first = harness.onboarding.supplier(supplier_id).unwrap().unwrap().stock_locations()[0];
        let second = harness
            .onboarding
            .add_stock_location(supplier_id, "Acme East", true)
            .unwrap();

        let other_id = harness
            .onboarding
            .register(registration(&harness, "other@acme.test", "NL"))
            .unwrap();
        let other_location =
            harness.onboarding.supplier(other_id).unwrap().unwrap().stock_locations()[0];

        // A location no supplier owns.
        let stray = StockLocationId::new(AggregateId::new());

        harness.shipments.insert(shipment("S1", stray));
        harness.shipments.insert(shipment("S2", first));
        harness.shipments.insert(shipment("S3", stray));
        harness.shipments.insert(shipment("S4", second));
        harness.shipments.insert(shipment("S5", other_location));
        harness.shipments.insert(shipment("S6", first));

        let query = SupplierShipments::new(harness.shipments.clone());

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        let mut numbers: Vec<_> = query
            .shipments_for(&supplier)
            .into_iter()
            .map(|s| s.number)
            .collect();
        numbers.sort();
        assert_eq!(numbers, vec!["S2", "S4", "S6"]);

        let other = harness.onboarding.supplier(other_id).unwrap().unwrap();
        let numbers: Vec<_> = query
            .shipments_for(&other)
            .into_iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec!["S5"]);
    }

    #[test]
    fn soft_delete_marks_supplier_and_is_one_way() {
        let harness = setup();

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert!(!supplier.is_deleted());
        assert!(supplier.deleted_at().is_none());

        harness.onboarding.delete(supplier_id).unwrap();

        let supplier = harness.onboarding.supplier(supplier_id).unwrap().unwrap();
        assert!(supplier.is_deleted());
        assert!(supplier.deleted_at().is_some());

        let err = harness.onboarding.delete(supplier_id).unwrap_err();
        assert!(matches!(err, OnboardingError::Conflict(_)));
    }

    #[test]
    fn directory_projection_tracks_the_lifecycle() {
        let harness = setup();
        // Subscribe before acting so no envelope is missed.
        let subscription = harness.bus.subscribe();
        let projection = SupplierDirectoryProjection::new(InMemoryReadStore::new());

        let supplier_id = harness
            .onboarding
            .register(registration(&harness, "vendor@acme.test", "NL"))
            .unwrap();
        harness
            .onboarding
            .update_details(supplier_id, Some("Acme Global".to_string()), None)
            .unwrap();
        harness.onboarding.delete(supplier_id).unwrap();

        // Everything is synchronous in-process; drain the buffered envelopes.
        while let Ok(envelope) = subscription.try_recv() {
            projection.apply_envelope(&envelope).unwrap();
        }

        let rm = projection.get(&supplier_id).unwrap();
        assert_eq!(rm.name, "Acme Global");
        assert_eq!(rm.email, "vendor@acme.test");
        assert_eq!(rm.location_count, 1);
        assert_eq!(rm.user_count, 0);
        assert!(rm.deleted);

        assert_eq!(projection.search_by_name("global").len(), 1);
        assert!(projection.search_by_name("nonesuch").is_empty());
    }

    #[test]
    fn registering_the_same_stream_twice_is_a_conflict() {
        use crate::command_dispatcher::{CommandDispatcher, DispatchError};
        use chrono::Utc;
        use vendhub_suppliers::{
            CommissionDefaults, RegisterSupplier, Supplier, SupplierCommand, SupplierId,
        };

        let store = Arc::new(InMemoryEventStore::new());
        let bus: Arc<Bus> = Arc::new(InMemoryEventBus::new());
        let dispatcher = CommandDispatcher::new(store, bus);

        let supplier_id = SupplierId::new(AggregateId::new());
        let cmd = SupplierCommand::Register(RegisterSupplier {
            supplier_id,
            name: "Acme Wholesale".to_string(),
            email: "vendor@acme.test".to_string(),
            address: Some(AddressId::new(AggregateId::new())),
            commission: CommissionOverrides::none(),
            defaults: CommissionDefaults::default(),
            users: vec![],
            occurred_at: Utc::now(),
        });

        let make = |id: AggregateId| Supplier::empty(SupplierId::new(id));

        let committed = dispatcher
            .dispatch(supplier_id.0, "suppliers.supplier", cmd.clone(), make)
            .unwrap();
        assert_eq!(committed.len(), 1);

        let err = dispatcher
            .dispatch(supplier_id.0, "suppliers.supplier", cmd, make)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Concurrency(_)));
    }
}
