//! In-memory adapters for the external user directory and address book.
//!
//! Tests/dev stand-ins for services this core only reads from.

use std::collections::HashMap;
use std::sync::RwLock;

use vendhub_directory::{UserAccount, UserDirectory};
use vendhub_suppliers::{Address, AddressId, AddressStore};

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    accounts: RwLock<Vec<UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: UserAccount) {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.retain(|a| a.id != account.id);
            accounts.push(account);
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let accounts = self.accounts.read().ok()?;
        accounts.iter().find(|a| a.email == email).cloned()
    }
}

/// In-memory address book.
#[derive(Debug, Default)]
pub struct InMemoryAddressStore {
    inner: RwLock<HashMap<AddressId, Address>>,
}

impl InMemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: Address) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(address.id, address);
        }
    }
}

impl AddressStore for InMemoryAddressStore {
    fn get(&self, id: AddressId) -> Option<Address> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }
}
