//! Integration tests for VetMart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vetmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_totals` - Price parsing through cart totals
//! - `checkout_flow` - Full checkout sessions through the shopper store
//! - `image_resolution` - Image references from raw catalog payloads
//!
//! This crate holds the fixtures the test files share.

use rand::SeedableRng;
use rand::rngs::StdRng;
use vetmart_checkout::{
    CatalogEntry, CatalogNormalizer, ImageResolver, OrderConfirmationGenerator, PricePolicy,
};
use vetmart_core::{Address, AddressId};

/// API base URL used by every fixture.
pub const BASE_URL: &str = "http://h:3000";

/// Catalog entry with a textual price and the given stock.
#[must_use]
pub fn catalog_entry(product_id: i64, outlet_id: i64, price: &str, stock: i64) -> CatalogEntry {
    let json = serde_json::json!({
        "productId": product_id,
        "outletId": outlet_id,
        "name": format!("Produto {product_id}"),
        "unitPrice": price,
        "stock": stock,
        "imageRefs": [format!("/uploads/{product_id}.png")],
    });
    // The literal above always matches the entry shape
    serde_json::from_value(json).unwrap_or_else(|e| panic!("fixture entry: {e}"))
}

/// Strict normalizer against [`BASE_URL`].
#[must_use]
pub fn normalizer() -> CatalogNormalizer {
    CatalogNormalizer::new(PricePolicy::Strict, ImageResolver::new(BASE_URL))
}

/// Generator with a fixed seed.
#[must_use]
pub fn seeded_generator(seed: u64) -> OrderConfirmationGenerator {
    OrderConfirmationGenerator::with_rng(StdRng::seed_from_u64(seed))
}

/// A complete address in Campinas.
#[must_use]
pub fn address(id: i64, is_primary: bool) -> Address {
    Address {
        id: AddressId::new(id),
        label: format!("Endereço {id}"),
        street: "Rua Barão de Jaguara".to_string(),
        number: id.to_string(),
        complement: None,
        district: "Centro".to_string(),
        city: "Campinas".to_string(),
        state: "SP".to_string(),
        zip: "13015-000".to_string(),
        is_primary,
    }
}
