//! Catalog entry normalization.
//!
//! Converts raw catalog entries from the product API into display listings
//! and cart-ready [`NewLineItem`]s, running prices through the
//! [`price`](crate::price) pipeline and images through the
//! [`ImageResolver`].

use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;
use vetmart_core::{Money, OutletId, ProductId};

use crate::cart::{LineKey, NewLineItem};
use crate::image::{ImageResolver, ResolvedImage};
use crate::price::{self, PriceError, PricePolicy, RawPrice};

/// Errors that can occur when turning a catalog entry into a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The entry's price could not be parsed under the strict policy.
    #[error("invalid price for {key}: {source}")]
    Price {
        key: LineKey,
        #[source]
        source: PriceError,
    },

    /// The outlet has no stock for this product.
    #[error("{0} is out of stock")]
    OutOfStock(LineKey),

    /// The outlet has fewer units than requested.
    #[error("{key}: requested {requested}, only {available} available")]
    InsufficientStock {
        key: LineKey,
        requested: u32,
        available: i64,
    },
}

/// A product as sold by one outlet, as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub product_id: ProductId,
    pub outlet_id: OutletId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub unit_price: RawPrice,
    #[serde(default)]
    pub stock: i64,
    /// Raw references; some endpoints send a JSON-encoded string instead of
    /// an array, and some arrays contain nulls.
    #[serde(default, deserialize_with = "deserialize_image_refs")]
    pub image_refs: Vec<String>,
}

impl CatalogEntry {
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.outlet_id)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Display projection of a catalog entry for product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    pub product_id: ProductId,
    pub outlet_id: OutletId,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub price_display: String,
    pub image: ResolvedImage,
    pub in_stock: bool,
}

/// Applies the price policy and image resolution to catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogNormalizer {
    policy: PricePolicy,
    images: ImageResolver,
}

impl CatalogNormalizer {
    #[must_use]
    pub const fn new(policy: PricePolicy, images: ImageResolver) -> Self {
        Self { policy, images }
    }

    #[must_use]
    pub const fn policy(&self) -> PricePolicy {
        self.policy
    }

    #[must_use]
    pub const fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Parse the entry's price under the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Price`] if the price is malformed and the
    /// policy is strict.
    pub fn unit_price(&self, entry: &CatalogEntry) -> Result<Money, CatalogError> {
        self.policy
            .apply(&entry.unit_price)
            .map_err(|source| CatalogError::Price {
                key: entry.key(),
                source,
            })
    }

    /// Resolve the first usable image of the entry.
    #[must_use]
    pub fn image(&self, entry: &CatalogEntry) -> ResolvedImage {
        self.images.resolve_first(&entry.image_refs)
    }

    /// Build the product-card projection of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Price`] under the strict policy for a malformed
    /// price.
    pub fn listing(&self, entry: &CatalogEntry) -> Result<CatalogListing, CatalogError> {
        let price = self.unit_price(entry)?;
        Ok(CatalogListing {
            product_id: entry.product_id,
            outlet_id: entry.outlet_id,
            name: entry.name.clone(),
            category: entry.category.clone(),
            price,
            price_display: price::format_with_symbol(price),
            image: self.image(entry),
            in_stock: entry.in_stock(),
        })
    }

    /// Build a cart line from an entry, checking the outlet's stock.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OutOfStock`] or
    /// [`CatalogError::InsufficientStock`] when the outlet cannot supply the
    /// quantity, or [`CatalogError::Price`] for a malformed price under the
    /// strict policy.
    pub fn to_line_item(
        &self,
        entry: &CatalogEntry,
        quantity: Option<NonZeroU32>,
    ) -> Result<NewLineItem, CatalogError> {
        let key = entry.key();
        if !entry.in_stock() {
            return Err(CatalogError::OutOfStock(key));
        }
        let requested = quantity.map_or(1, NonZeroU32::get);
        if i64::from(requested) > entry.stock {
            return Err(CatalogError::InsufficientStock {
                key,
                requested,
                available: entry.stock,
            });
        }

        let unit_price = self.unit_price(entry)?;
        let image = self.image(entry);
        debug!(
            %key,
            unit_price = unit_price.minor(),
            resolved = image.is_resolved(),
            "Normalized catalog entry"
        );

        Ok(NewLineItem {
            product_id: entry.product_id,
            outlet_id: entry.outlet_id,
            name: entry.name.clone(),
            unit_price,
            quantity,
            image,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawImageRefs {
    Many(Vec<Option<String>>),
    One(Option<String>),
}

fn deserialize_image_refs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawImageRefs::deserialize(deserializer)? {
        RawImageRefs::Many(refs) => refs.into_iter().flatten().collect(),
        RawImageRefs::One(single) => single.into_iter().collect(),
    })
}
