//! Address references at the supplier boundary.
//!
//! Addresses are owned by an external address book; a supplier holds a
//! reference and never manages the address's own lifecycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vendhub_core::{AggregateId, Entity};

/// Address identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub AggregateId);

impl AddressId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AddressId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A postal address record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub line1: String,
    pub city: String,
    /// ISO 3166-1 alpha-2 code.
    pub country: String,
}

impl Entity for Address {
    type Id = AddressId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Read-only lookup into the external address book.
pub trait AddressStore: Send + Sync {
    fn get(&self, id: AddressId) -> Option<Address>;

    /// Country code for an address reference.
    fn country_of(&self, id: AddressId) -> Option<String> {
        self.get(id).map(|a| a.country)
    }
}

impl<S> AddressStore for Arc<S>
where
    S: AddressStore + ?Sized,
{
    fn get(&self, id: AddressId) -> Option<Address> {
        (**self).get(id)
    }

    fn country_of(&self, id: AddressId) -> Option<String> {
        (**self).country_of(id)
    }
}
