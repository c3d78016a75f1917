//! Welcome notification boundary.
//!
//! Transport (mail templating, delivery) lives outside this system. The port
//! is fire-and-forget: adapters report their own failures, and a failed send
//! never rolls back the registration that triggered it.

use std::sync::{Arc, Mutex};

use vendhub_suppliers::SupplierId;

/// Outbound notification port.
pub trait NotificationGateway: Send + Sync {
    /// Queue a welcome notification for a newly registered supplier.
    fn send_welcome(&self, supplier_id: SupplierId);
}

impl<G> NotificationGateway for Arc<G>
where
    G: NotificationGateway + ?Sized,
{
    fn send_welcome(&self, supplier_id: SupplierId) {
        (**self).send_welcome(supplier_id)
    }
}

/// Gateway that only logs the send (dev default).
#[derive(Debug, Default)]
pub struct LogNotificationGateway;

impl LogNotificationGateway {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationGateway for LogNotificationGateway {
    fn send_welcome(&self, supplier_id: SupplierId) {
        tracing::info!(%supplier_id, "supplier welcome notification queued");
    }
}

/// Gateway that records every recipient, for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingNotificationGateway {
    sent: Mutex<Vec<SupplierId>>,
}

impl RecordingNotificationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipients seen so far, in send order.
    pub fn sent(&self) -> Vec<SupplierId> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl NotificationGateway for RecordingNotificationGateway {
    fn send_welcome(&self, supplier_id: SupplierId) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(supplier_id);
        }
    }
}
