use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;
use thiserror::Error;

use vendhub_core::AggregateId;
use vendhub_events::EventEnvelope;
use vendhub_suppliers::{CommissionTerms, SupplierEvent, SupplierId};

use crate::onboarding::SUPPLIER_AGGREGATE;
use crate::read_model::ReadStore;

/// Queryable supplier read model: the admin-facing vendor directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierReadModel {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: String,
    pub commission: CommissionTerms,
    pub user_count: usize,
    pub location_count: usize,
    pub deleted: bool,
}

#[derive(Debug, Error)]
pub enum SupplierProjectionError {
    #[error("failed to deserialize supplier event: {0}")]
    Deserialize(String),

    #[error("stream mismatch: {0}")]
    StreamMismatch(String),

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },
}

/// Supplier directory projection.
///
/// Consumes published envelopes (JSON payloads) and maintains a read model of
/// suppliers suitable for lookup and basic search. Per-stream sequence
/// cursors make replays and duplicate deliveries no-ops.
#[derive(Debug)]
pub struct SupplierDirectoryProjection<S>
where
    S: ReadStore<SupplierId, SupplierReadModel>,
{
    store: S,
    cursors: RwLock<HashMap<AggregateId, u64>>,
}

impl<S> SupplierDirectoryProjection<S>
where
    S: ReadStore<SupplierId, SupplierReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    fn cursor(&self, aggregate_id: AggregateId) -> u64 {
        match self.cursors.read() {
            Ok(cursors) => *cursors.get(&aggregate_id).unwrap_or(&0),
            Err(_) => 0,
        }
    }

    fn advance_cursor(&self, aggregate_id: AggregateId, sequence_number: u64) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.insert(aggregate_id, sequence_number);
        }
    }

    /// Query the read model for one supplier.
    pub fn get(&self, supplier_id: &SupplierId) -> Option<SupplierReadModel> {
        self.store.get(supplier_id)
    }

    /// List all suppliers (disposable read model).
    pub fn list(&self) -> Vec<SupplierReadModel> {
        self.store.list()
    }

    /// Simple in-memory search by name substring (case-insensitive).
    pub fn search_by_name(&self, query: &str) -> Vec<SupplierReadModel> {
        let q = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|rm| rm.name.to_lowercase().contains(&q))
            .collect()
    }

    /// Apply a published envelope into the projection.
    ///
    /// - Ignores non-supplier aggregates (allows sharing a bus across modules).
    /// - Enforces monotonic sequence per aggregate stream.
    /// - Idempotent for at-least-once delivery (replays <= cursor are ignored).
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), SupplierProjectionError> {
        if envelope.aggregate_type() != SUPPLIER_AGGREGATE {
            return Ok(());
        }

        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();
        let last = self.cursor(aggregate_id);

        if seq == 0 {
            return Err(SupplierProjectionError::NonMonotonicSequence { last, found: seq });
        }

        if seq <= last {
            // Duplicate or replay; safe to ignore.
            return Ok(());
        }

        if seq != last + 1 && last != 0 {
            // The first event may land at any positive sequence (some stores
            // start above 1); after that, strict increments only.
            return Err(SupplierProjectionError::NonMonotonicSequence { last, found: seq });
        }

        let event: SupplierEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| SupplierProjectionError::Deserialize(e.to_string()))?;

        let supplier_id = event_supplier_id(&event);
        if supplier_id.0 != aggregate_id {
            return Err(SupplierProjectionError::StreamMismatch(
                "event supplier_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match event {
            SupplierEvent::SupplierRegistered(e) => {
                self.store.upsert(
                    e.supplier_id,
                    SupplierReadModel {
                        supplier_id: e.supplier_id,
                        name: e.name,
                        email: e.email,
                        commission: e.commission,
                        user_count: e.users.len(),
                        location_count: 0,
                        deleted: false,
                    },
                );
            }
            SupplierEvent::SupplierDetailsUpdated(e) => {
                if let Some(mut rm) = self.store.get(&e.supplier_id) {
                    rm.name = e.name;
                    rm.email = e.email;
                    self.store.upsert(e.supplier_id, rm);
                }
            }
            SupplierEvent::CommissionChanged(e) => {
                if let Some(mut rm) = self.store.get(&e.supplier_id) {
                    rm.commission = e.commission;
                    self.store.upsert(e.supplier_id, rm);
                }
            }
            SupplierEvent::UserLinked(e) => {
                if let Some(mut rm) = self.store.get(&e.supplier_id) {
                    rm.user_count += 1;
                    self.store.upsert(e.supplier_id, rm);
                }
            }
            SupplierEvent::StockLocationAttached(e) => {
                if let Some(mut rm) = self.store.get(&e.supplier_id) {
                    rm.location_count += 1;
                    self.store.upsert(e.supplier_id, rm);
                }
            }
            SupplierEvent::SupplierDeleted(e) => {
                if let Some(mut rm) = self.store.get(&e.supplier_id) {
                    rm.deleted = true;
                    self.store.upsert(e.supplier_id, rm);
                }
            }
        }

        // Advance cursor after successful apply.
        self.advance_cursor(aggregate_id, seq);

        Ok(())
    }

    /// Rebuild the read model from scratch by replaying envelopes.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), SupplierProjectionError> {
        self.store.clear();
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.clear();
        }

        // Deterministic replay order: aggregate, then sequence.
        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }

        Ok(())
    }
}

fn event_supplier_id(event: &SupplierEvent) -> SupplierId {
    match event {
        SupplierEvent::SupplierRegistered(e) => e.supplier_id,
        SupplierEvent::SupplierDetailsUpdated(e) => e.supplier_id,
        SupplierEvent::CommissionChanged(e) => e.supplier_id,
        SupplierEvent::UserLinked(e) => e.supplier_id,
        SupplierEvent::StockLocationAttached(e) => e.supplier_id,
        SupplierEvent::SupplierDeleted(e) => e.supplier_id,
    }
}
