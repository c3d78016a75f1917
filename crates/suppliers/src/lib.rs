//! Supplier domain: the aggregate root of the marketplace vendor lifecycle,
//! commission resolution, and the address reference boundary.

pub mod address;
pub mod commission;
pub mod supplier;

pub use address::{Address, AddressId, AddressStore};
pub use commission::{CommissionDefaults, CommissionOverrides, CommissionTerms};
pub use supplier::{
    AttachStockLocation, CommissionChanged, DeleteSupplier, LinkUser, RegisterSupplier,
    SetCommission, StockLocationAttached, StockLocationId, Supplier, SupplierCommand,
    SupplierDeleted, SupplierDetailsUpdated, SupplierEvent, SupplierId, SupplierRegistered,
    UpdateSupplierDetails, UserLinked,
};
