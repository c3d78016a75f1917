use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vendhub_core::{AggregateId, Entity};
use vendhub_suppliers::SupplierId;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

/// Variant identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub AggregateId);

impl VariantId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A sellable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Join record: a supplier offers a variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierVariant {
    pub supplier_id: SupplierId,
    pub variant_id: VariantId,
}

/// Persistence boundary for catalog lookups.
pub trait CatalogStore: Send + Sync {
    fn product(&self, id: ProductId) -> Option<Product>;

    fn variant(&self, id: VariantId) -> Option<Variant>;

    /// Join records for one supplier.
    fn supplier_variants(&self, supplier_id: SupplierId) -> Vec<SupplierVariant>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn product(&self, id: ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn variant(&self, id: VariantId) -> Option<Variant> {
        (**self).variant(id)
    }

    fn supplier_variants(&self, supplier_id: SupplierId) -> Vec<SupplierVariant> {
        (**self).supplier_variants(supplier_id)
    }
}
