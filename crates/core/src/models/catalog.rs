//! Availability catalog models: products and their open inventory batches.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{InventoryId, ProductCode, weighted_average};

/// Label shown for batches received without a batch code.
pub const NO_BATCH_LABEL: &str = "No batch";

/// An open inventory batch ("lote") of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Inventory row backing this batch.
    pub inventory_id: InventoryId,
    /// Batch code printed on the receipt, if any.
    #[serde(default)]
    pub code: Option<String>,
    /// Expiry date, if the product expires.
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    /// Units available in this batch.
    pub quantity: i64,
    /// Unit price paid for this batch.
    pub unit_price: Decimal,
    /// Whether the batch was received under a supplier commitment letter.
    #[serde(default)]
    pub commitment_letter: bool,
}

impl Batch {
    /// Display label, falling back to [`NO_BATCH_LABEL`] for blank codes.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => NO_BATCH_LABEL,
        }
    }

    /// Available quantity, treating corrupt negative values as empty.
    #[must_use]
    pub fn available(&self) -> i64 {
        self.quantity.max(0)
    }
}

/// A product with its open batches, in consumption order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product code (catalog key).
    pub code: ProductCode,
    /// Product name.
    pub name: String,
    /// Free-text characteristics (size, material, ...).
    #[serde(default)]
    pub features: String,
    /// Presentation (box, vial, unit pack, ...).
    #[serde(default)]
    pub presentation: String,
    /// Unit of measure.
    #[serde(default)]
    pub unit: String,
    /// Total stock as reported by the catalog.
    pub total_stock: i64,
    /// Open batches. Order is consumption priority and is never changed.
    #[serde(default)]
    pub batches: Vec<Batch>,
}

impl Product {
    /// Quantity-weighted mean unit price across all batches.
    ///
    /// Zero when the product has no batches or no batch quantity.
    #[must_use]
    pub fn average_unit_price(&self) -> Decimal {
        weighted_average(self.batches.iter().map(|b| (b.quantity, b.unit_price)))
    }
}

/// Read-only snapshot of available products, as delivered by the catalog
/// provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityCatalog {
    products: Vec<Product>,
}

impl AvailabilityCatalog {
    /// Wrap a product list in delivery order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Find a product by code.
    #[must_use]
    pub fn get(&self, code: ProductCode) -> Option<&Product> {
        self.products.iter().find(|p| p.code == code)
    }

    /// All products in delivery order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products whose name, features or code contain `query`, case-insensitively.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> + 'a {
        let needle = query.trim().to_lowercase();
        self.products.iter().filter(move |p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.features.to_lowercase().contains(&needle)
                || p.code.to_string() == needle
        })
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl From<Vec<Product>> for AvailabilityCatalog {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn batch(id: i64, code: Option<&str>, quantity: i64, price: Decimal) -> Batch {
        Batch {
            inventory_id: InventoryId::new(id),
            code: code.map(String::from),
            expiry: None,
            quantity,
            unit_price: price,
            commitment_letter: false,
        }
    }

    fn product(code: i64, name: &str, batches: Vec<Batch>) -> Product {
        Product {
            code: ProductCode::new(code),
            name: name.to_string(),
            features: String::new(),
            presentation: "Box".to_string(),
            unit: "u".to_string(),
            total_stock: batches.iter().map(|b| b.quantity).sum(),
            batches,
        }
    }

    #[test]
    fn test_batch_label_sentinel() {
        assert_eq!(batch(1, Some("L-001"), 1, dec!(1)).label(), "L-001");
        assert_eq!(batch(1, None, 1, dec!(1)).label(), NO_BATCH_LABEL);
        assert_eq!(batch(1, Some("   "), 1, dec!(1)).label(), NO_BATCH_LABEL);
    }

    #[test]
    fn test_average_unit_price_weighted() {
        let p = product(
            1,
            "Syringe 5ml",
            vec![batch(1, Some("A"), 6, dec!(20)), batch(2, Some("B"), 4, dec!(30))],
        );
        assert_eq!(p.average_unit_price(), dec!(24));
    }

    #[test]
    fn test_average_unit_price_without_batches_is_zero() {
        let p = product(1, "Syringe 5ml", vec![]);
        assert_eq!(p.average_unit_price(), Decimal::ZERO);
    }

    #[test]
    fn test_catalog_lookup_and_search() {
        let catalog = AvailabilityCatalog::new(vec![
            product(1, "Syringe 5ml", vec![]),
            product(2, "Sterile Gauze", vec![]),
        ]);

        assert_eq!(catalog.get(ProductCode::new(2)).unwrap().name, "Sterile Gauze");
        assert!(catalog.get(ProductCode::new(3)).is_none());

        let hits: Vec<_> = catalog.search("gauze").map(|p| p.code).collect();
        assert_eq!(hits, vec![ProductCode::new(2)]);
        assert_eq!(catalog.search("").count(), 2);
    }

    #[test]
    fn test_product_deserializes_with_defaults() {
        let json = r#"{
            "code": 5,
            "name": "Catheter",
            "total_stock": 3,
            "batches": [
                {"inventory_id": 10, "quantity": 3, "unit_price": "4.50", "expiry": "2027-01-31"}
            ]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.batches.len(), 1);
        assert_eq!(p.batches[0].label(), NO_BATCH_LABEL);
        assert!(!p.batches[0].commitment_letter);
        assert_eq!(p.batches[0].unit_price, dec!(4.50));
    }
}
