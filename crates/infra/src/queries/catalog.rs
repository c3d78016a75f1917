use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use vendhub_catalog::{CatalogStore, Product, ProductId, SupplierVariant, Variant, VariantId};
use vendhub_suppliers::SupplierId;

/// Read-time joins from a supplier into the catalog.
#[derive(Debug)]
pub struct SupplierCatalog<C>
where
    C: CatalogStore,
{
    catalog: C,
}

impl<C> SupplierCatalog<C>
where
    C: CatalogStore,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Variants a supplier offers, through the supplier-variant join.
    pub fn variants_for(&self, supplier_id: SupplierId) -> Vec<Variant> {
        self.catalog
            .supplier_variants(supplier_id)
            .into_iter()
            .filter_map(|link| self.catalog.variant(link.variant_id))
            .collect()
    }

    /// Products a supplier offers, reached transitively through variants.
    ///
    /// De-duplicated: several variants of the same product yield one entry.
    pub fn products_for(&self, supplier_id: SupplierId) -> Vec<Product> {
        let mut seen = HashSet::new();
        self.variants_for(supplier_id)
            .into_iter()
            .filter(|variant| seen.insert(variant.product_id))
            .filter_map(|variant| self.catalog.product(variant.product_id))
            .collect()
    }
}

/// In-memory catalog store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Product>>,
    variants: RwLock<HashMap<VariantId, Variant>>,
    links: RwLock<Vec<SupplierVariant>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        if let Ok(mut products) = self.products.write() {
            products.insert(product.id, product);
        }
    }

    pub fn insert_variant(&self, variant: Variant) {
        if let Ok(mut variants) = self.variants.write() {
            variants.insert(variant.id, variant);
        }
    }

    pub fn link(&self, link: SupplierVariant) {
        if let Ok(mut links) = self.links.write() {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn product(&self, id: ProductId) -> Option<Product> {
        let products = self.products.read().ok()?;
        products.get(&id).cloned()
    }

    fn variant(&self, id: VariantId) -> Option<Variant> {
        let variants = self.variants.read().ok()?;
        variants.get(&id).cloned()
    }

    fn supplier_variants(&self, supplier_id: SupplierId) -> Vec<SupplierVariant> {
        let links = match self.links.read() {
            Ok(l) => l,
            Err(_) => return vec![],
        };

        links
            .iter()
            .filter(|l| l.supplier_id == supplier_id)
            .copied()
            .collect()
    }
}
