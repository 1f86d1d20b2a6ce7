//! VetMart Checkout - Cart and checkout engine.
//!
//! Everything between "the shopper tapped Add to cart" and "the order
//! confirmation screen", with no UI and no network access:
//!
//! - [`price`] - Parse catalog prices into [`Money`](vetmart_core::Money) and format them back
//! - [`image`] - Resolve the many shapes of image references into displayable URLs
//! - [`catalog`] - Turn raw catalog entries into listings and cart lines
//! - [`cart`] - Cart keyed by (product, outlet) with merge-on-add semantics
//! - [`address`] - Address book with a single primary address
//! - [`favorites`] - Favorite product/outlet pairs
//! - [`checkout`] - Step-by-step checkout session with per-step guards
//! - [`confirmation`] - Order number, tracking code and delivery estimate
//! - [`store`] - Shopper state owned by the host
//! - [`config`] - Environment-based configuration
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroU32;
//!
//! use chrono::Utc;
//! use vetmart_checkout::{
//!     CatalogEntry, CheckoutConfig, CheckoutStep, PaymentMethodKind, ShopperStore,
//! };
//! use vetmart_core::{Address, AddressId, TaxId};
//!
//! let config = CheckoutConfig::new("http://localhost:3000").unwrap();
//! let normalizer = config.catalog_normalizer();
//!
//! let entry: CatalogEntry = serde_json::from_str(
//!     r#"{"productId": 1, "outletId": 10, "name": "Antipulgas",
//!         "unitPrice": "R$ 45,90", "stock": 5,
//!         "imageRefs": ["/uploads/antipulgas.png"]}"#,
//! )
//! .unwrap();
//!
//! let mut store = ShopperStore::new();
//! store.addresses.upsert(Address {
//!     id: AddressId::new(1),
//!     label: "Casa".to_string(),
//!     street: "Rua das Flores".to_string(),
//!     number: "42".to_string(),
//!     complement: None,
//!     district: "Centro".to_string(),
//!     city: "Campinas".to_string(),
//!     state: "SP".to_string(),
//!     zip: "13010-000".to_string(),
//!     is_primary: true,
//! });
//! store
//!     .cart
//!     .add(normalizer.to_line_item(&entry, NonZeroU32::new(2)).unwrap())
//!     .unwrap();
//!
//! let mut session = store.begin_checkout().unwrap();
//! session.select_payment_method(PaymentMethodKind::Pix).unwrap();
//! session.advance(Utc::now()).unwrap(); // payment details
//! session.advance(Utc::now()).unwrap(); // review
//! session.advance(Utc::now()).unwrap(); // invoice
//! session.set_invoice_tax_id(TaxId::parse("123.456.789-09").unwrap()).unwrap();
//! assert_eq!(session.advance(Utc::now()).unwrap(), CheckoutStep::Confirmation);
//!
//! let confirmation = store.complete_checkout(session).unwrap();
//! assert!(confirmation.tracking_code.ends_with("BR"));
//! assert!(store.cart.is_empty());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod favorites;
pub mod image;
pub mod price;
pub mod store;

pub use address::{AddressBook, AddressError};
pub use cart::{Cart, CartError, LineItem, LineKey, NewLineItem};
pub use catalog::{CatalogEntry, CatalogError, CatalogListing, CatalogNormalizer};
pub use checkout::{
    CardDetails, CardField, CheckoutSession, CheckoutStep, CheckoutSummary,
    PaymentMethodKind, PaymentMethodSelection, StepError, SummaryLine,
};
pub use config::{CheckoutConfig, ConfigError};
pub use confirmation::{OrderConfirmation, OrderConfirmationGenerator};
pub use error::{Error, Result};
pub use favorites::Favorites;
pub use image::{ImageResolver, ResolvedImage, TypoFix, TypoTable};
pub use price::{PriceError, PricePolicy, RawPrice};
pub use store::ShopperStore;
