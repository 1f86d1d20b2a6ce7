//! Shopping cart keyed by product and outlet.
//!
//! The same product sold by two different pharmacies is two distinct lines.
//! Adding an item whose key is already in the cart merges quantities, so a
//! cart never holds duplicate keys. Quantities are [`NonZeroU32`]: a line can
//! never be stored at zero.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vetmart_core::{Money, OutletId, ProductId};

use crate::image::ResolvedImage;
use crate::price;

/// Identity of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    pub outlet_id: OutletId,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, outlet_id: OutletId) -> Self {
        Self {
            product_id,
            outlet_id,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product {} at outlet {}", self.product_id, self.outlet_id)
    }
}

/// Errors that can occur when mutating a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No line with this key is in the cart.
    #[error("cart has no line for {0}")]
    LineNotFound(LineKey),

    /// The line quantity would exceed `u32::MAX`.
    #[error("quantity overflow for {0}")]
    QuantityOverflow(LineKey),

    /// The cart total would exceed the representable amount.
    #[error("cart total overflow when updating {0}")]
    AmountOverflow(LineKey),

    /// A persisted cart contained the same key twice.
    #[error("duplicate cart line for {0}")]
    DuplicateLine(LineKey),
}

/// Input to [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub outlet_id: OutletId,
    pub name: String,
    pub unit_price: Money,
    /// Defaults to 1.
    pub quantity: Option<NonZeroU32>,
    pub image: ResolvedImage,
}

impl NewLineItem {
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.outlet_id)
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    product_id: ProductId,
    outlet_id: OutletId,
    name: String,
    unit_price: Money,
    quantity: NonZeroU32,
    image: ResolvedImage,
}

impl LineItem {
    fn from_new(item: NewLineItem, quantity: NonZeroU32) -> Self {
        Self {
            product_id: item.product_id,
            outlet_id: item.outlet_id,
            name: item.name,
            unit_price: item.unit_price,
            quantity,
            image: item.image,
        }
    }

    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.outlet_id)
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    #[must_use]
    pub const fn outlet_id(&self) -> OutletId {
        self.outlet_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    #[must_use]
    pub const fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    #[must_use]
    pub const fn image(&self) -> &ResolvedImage {
        &self.image
    }

    /// `unit_price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity.get())
    }

    pub(crate) fn subtotal_unchecked(&self) -> Money {
        Money::from_minor(self.unit_price.minor() * i64::from(self.quantity.get()))
    }
}

/// The shopper's cart.
///
/// Lines keep insertion order, which is also display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item, merging into an existing line with the same key.
    ///
    /// A merged line keeps its original name, price and image; only the
    /// quantity changes. Returns the line's quantity after the add.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] or [`CartError::AmountOverflow`]
    /// without modifying the cart.
    pub fn add(&mut self, item: NewLineItem) -> Result<NonZeroU32, CartError> {
        let key = item.key();
        let incoming = item.quantity.unwrap_or(NonZeroU32::MIN);
        let unit_price = self.get(key).map_or(item.unit_price, LineItem::unit_price);
        self.ensure_total_fits(key, unit_price, incoming.get())?;

        if let Some(line) = self.line_mut(key) {
            let quantity = line
                .quantity
                .checked_add(incoming.get())
                .ok_or(CartError::QuantityOverflow(key))?;
            line.quantity = quantity;
            debug!(%key, quantity = quantity.get(), "Merged into existing cart line");
            return Ok(quantity);
        }

        self.items.push(LineItem::from_new(item, incoming));
        debug!(%key, quantity = incoming.get(), "Added cart line");
        Ok(incoming)
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown key, or an overflow
    /// error without modifying the cart.
    pub fn increment(&mut self, key: LineKey) -> Result<NonZeroU32, CartError> {
        let unit_price = self
            .get(key)
            .map(LineItem::unit_price)
            .ok_or(CartError::LineNotFound(key))?;
        self.ensure_total_fits(key, unit_price, 1)?;

        let line = self.line_mut(key).ok_or(CartError::LineNotFound(key))?;
        line.quantity = line
            .quantity
            .checked_add(1)
            .ok_or(CartError::QuantityOverflow(key))?;
        debug!(%key, quantity = line.quantity.get(), "Incremented cart line");
        Ok(line.quantity)
    }

    /// Decrease a line's quantity by one, stopping at 1.
    ///
    /// Decrementing a line at quantity 1 is a no-op; use [`Cart::remove`] to
    /// delete it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown key.
    pub fn decrement(&mut self, key: LineKey) -> Result<NonZeroU32, CartError> {
        let line = self.line_mut(key).ok_or(CartError::LineNotFound(key))?;
        if let Some(lower) = NonZeroU32::new(line.quantity.get() - 1) {
            line.quantity = lower;
        }
        debug!(%key, quantity = line.quantity.get(), "Decremented cart line");
        Ok(line.quantity)
    }

    /// Delete a line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown key.
    pub fn remove(&mut self, key: LineKey) -> Result<LineItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.key() == key)
            .ok_or(CartError::LineNotFound(key))?;
        debug!(%key, "Removed cart line");
        Ok(self.items.remove(index))
    }

    /// Take the lines of a placed order out of this cart.
    ///
    /// Each ordered line lowers the matching line here by the ordered
    /// quantity; a line that reaches zero is removed. Lines and units that are
    /// not part of the order stay in the cart.
    pub fn remove_ordered(&mut self, ordered: &Self) {
        for placed in ordered {
            let key = placed.key();
            let Some(line) = self.line_mut(key) else {
                continue;
            };
            let remaining = line.quantity.get().saturating_sub(placed.quantity.get());
            if let Some(quantity) = NonZeroU32::new(remaining) {
                line.quantity = quantity;
                debug!(%key, quantity = quantity.get(), "Kept unordered units in cart");
            } else {
                self.items.retain(|line| line.key() != key);
                debug!(%key, "Removed ordered cart line");
            }
        }
    }

    pub fn clear(&mut self) {
        debug!(lines = self.items.len(), "Cleared cart");
        self.items.clear();
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Money {
        price::sum(&self.items)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    #[must_use]
    pub fn get(&self, key: LineKey) -> Option<&LineItem> {
        self.items.iter().find(|line| line.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: LineKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn line_mut(&mut self, key: LineKey) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.key() == key)
    }

    fn ensure_total_fits(
        &self,
        key: LineKey,
        unit_price: Money,
        extra_quantity: u32,
    ) -> Result<(), CartError> {
        unit_price
            .checked_mul(extra_quantity)
            .and_then(|extra| self.total().checked_add(extra))
            .map(|_| ())
            .ok_or(CartError::AmountOverflow(key))
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        for (i, line) in items.iter().enumerate() {
            if items.iter().skip(i + 1).any(|other| other.key() == line.key()) {
                return Err(CartError::DuplicateLine(line.key()));
            }
        }
        let mut total = Money::ZERO;
        for line in &items {
            total = line
                .subtotal()
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(CartError::AmountOverflow(line.key()))?;
        }
        let cart = Self { items };
        Ok(cart)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(product: i64, outlet: i64) -> LineKey {
        LineKey::new(ProductId::new(product), OutletId::new(outlet))
    }

    fn item(product: i64, outlet: i64, price: i64, quantity: Option<u32>) -> NewLineItem {
        NewLineItem {
            product_id: ProductId::new(product),
            outlet_id: OutletId::new(outlet),
            name: format!("Produto {product}"),
            unit_price: Money::from_minor(price),
            quantity: quantity.and_then(NonZeroU32::new),
            image: ResolvedImage::Unresolved,
        }
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_add_defaults_to_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(item(1, 10, 4590, None)).unwrap(), qty(1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(key(1, 10)).unwrap().quantity(), qty(1));
    }

    #[test]
    fn test_add_same_key_merges() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 4590, Some(2))).unwrap();
        assert_eq!(cart.add(item(1, 10, 4590, Some(3))).unwrap(), qty(5));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Money::from_minor(4590 * 5));
    }

    #[test]
    fn test_merge_keeps_first_price() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 1000, None)).unwrap();
        cart.add(item(1, 10, 9999, None)).unwrap();
        assert_eq!(cart.get(key(1, 10)).unwrap().unit_price(), Money::from_minor(1000));
    }

    #[test]
    fn test_same_product_different_outlets_are_distinct() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 4590, None)).unwrap();
        cart.add(item(1, 20, 4390, None)).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total(), Money::from_minor(4590 + 4390));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut cart = Cart::new();
        cart.add(item(3, 10, 100, None)).unwrap();
        cart.add(item(1, 10, 100, None)).unwrap();
        cart.add(item(3, 10, 100, None)).unwrap();
        cart.add(item(2, 10, 100, None)).unwrap();
        let order: Vec<i64> = cart.iter().map(|l| l.product_id().as_i64()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 100, None)).unwrap();
        assert_eq!(cart.increment(key(1, 10)).unwrap(), qty(2));
        assert_eq!(cart.decrement(key(1, 10)).unwrap(), qty(1));
    }

    #[test]
    fn test_decrement_bottoms_out_at_one() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 100, None)).unwrap();
        assert_eq!(cart.decrement(key(1, 10)).unwrap(), qty(1));
        assert_eq!(cart.decrement(key(1, 10)).unwrap(), qty(1));
        assert!(cart.contains(key(1, 10)));
    }

    #[test]
    fn test_unknown_key_errors() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.increment(key(9, 9)),
            Err(CartError::LineNotFound(key(9, 9)))
        );
        assert_eq!(
            cart.decrement(key(9, 9)),
            Err(CartError::LineNotFound(key(9, 9)))
        );
        assert_eq!(cart.remove(key(9, 9)), Err(CartError::LineNotFound(key(9, 9))));
    }

    #[test]
    fn test_remove_regardless_of_quantity() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 100, Some(7))).unwrap();
        cart.add(item(2, 10, 200, None)).unwrap();
        let removed = cart.remove(key(1, 10)).unwrap();
        assert_eq!(removed.quantity(), qty(7));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Money::from_minor(200));
    }

    #[test]
    fn test_remove_ordered_keeps_unordered_units() {
        let mut ordered = Cart::new();
        ordered.add(item(1, 10, 500, Some(2))).unwrap();
        ordered.add(item(2, 10, 300, None)).unwrap();

        let mut live = ordered.clone();
        live.increment(key(1, 10)).unwrap();
        live.add(item(3, 11, 700, None)).unwrap();

        live.remove_ordered(&ordered);
        assert_eq!(live.len(), 2);
        assert_eq!(live.get(key(1, 10)).unwrap().quantity(), qty(1));
        assert!(!live.contains(key(2, 10)));
        assert!(live.contains(key(3, 11)));
        assert_eq!(live.total(), Money::from_minor(1200));
    }

    #[test]
    fn test_remove_ordered_tolerates_missing_and_smaller_lines() {
        let mut ordered = Cart::new();
        ordered.add(item(1, 10, 500, Some(3))).unwrap();
        ordered.add(item(2, 10, 300, None)).unwrap();

        let mut live = Cart::new();
        live.add(item(1, 10, 500, None)).unwrap();

        live.remove_ordered(&ordered);
        assert!(live.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 100, Some(2))).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_item_count() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 100, Some(2))).unwrap();
        cart.add(item(2, 10, 100, Some(3))).unwrap();
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_total_is_order_independent() {
        let mut a = Cart::new();
        a.add(item(1, 10, 4590, Some(2))).unwrap();
        a.add(item(2, 10, 14990, None)).unwrap();

        let mut b = Cart::new();
        b.add(item(2, 10, 14990, Some(3))).unwrap();
        b.add(item(1, 10, 4590, None)).unwrap();
        b.decrement(key(2, 10)).unwrap();
        b.decrement(key(2, 10)).unwrap();
        b.increment(key(1, 10)).unwrap();

        assert_eq!(a.total(), b.total());
        assert_eq!(a.total(), Money::from_minor(24170));
    }

    #[test]
    fn test_quantity_overflow_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 0, Some(u32::MAX))).unwrap();
        assert_eq!(
            cart.add(item(1, 10, 0, None)),
            Err(CartError::QuantityOverflow(key(1, 10)))
        );
        assert_eq!(
            cart.increment(key(1, 10)),
            Err(CartError::QuantityOverflow(key(1, 10)))
        );
        assert_eq!(cart.get(key(1, 10)).unwrap().quantity(), qty(u32::MAX));
    }

    #[test]
    fn test_amount_overflow_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, i64::MAX / 2, Some(2))).unwrap();
        assert_eq!(
            cart.add(item(2, 10, i64::MAX / 2, None)),
            Err(CartError::AmountOverflow(key(2, 10)))
        );
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip_and_duplicate_rejection() {
        let mut cart = Cart::new();
        cart.add(item(1, 10, 4590, Some(2))).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);

        let line = serde_json::to_value(cart.get(key(1, 10)).unwrap()).unwrap();
        let duplicated = serde_json::Value::Array(vec![line.clone(), line]);
        assert!(serde_json::from_value::<Cart>(duplicated).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected_on_deserialize() {
        let json = r#"[{
            "productId": 1, "outletId": 10, "name": "X", "unitPrice": 100,
            "quantity": 0, "image": {"kind": "unresolved"}
        }]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
