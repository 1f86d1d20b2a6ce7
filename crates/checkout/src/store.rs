//! Shopper state owned by the host.
//!
//! Cart, addresses and favorites live in one explicit value that the host
//! passes to whatever needs it, instead of in ambient UI contexts. Persisting
//! it between app launches is the host's job; the whole store round-trips
//! through serde.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::address::AddressBook;
use crate::cart::Cart;
use crate::checkout::{CheckoutSession, StepError};
use crate::confirmation::{OrderConfirmation, OrderConfirmationGenerator};
use crate::favorites::Favorites;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperStore {
    pub cart: Cart,
    pub addresses: AddressBook,
    pub favorites: Favorites,
}

impl ShopperStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a checkout session over a snapshot of the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::EmptyCart`] if the cart has no lines.
    pub fn begin_checkout(&self) -> Result<CheckoutSession, StepError> {
        CheckoutSession::begin(self.cart.clone(), &self.addresses)
    }

    /// Like [`ShopperStore::begin_checkout`] with an explicit generator.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::EmptyCart`] if the cart has no lines.
    pub fn begin_checkout_with_generator(
        &self,
        generator: OrderConfirmationGenerator,
    ) -> Result<CheckoutSession, StepError> {
        CheckoutSession::begin_with_generator(self.cart.clone(), &self.addresses, generator)
    }

    /// Finish a confirmed session: the ordered lines leave the cart.
    ///
    /// Only the quantities in the session's snapshot are taken out; anything
    /// added to the cart after checkout began stays for the next order.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NotConfirmed`] if the session has not reached
    /// confirmation; the cart is left as is.
    pub fn complete_checkout(
        &mut self,
        session: CheckoutSession,
    ) -> Result<OrderConfirmation, StepError> {
        let confirmation = session
            .confirmation()
            .cloned()
            .ok_or(StepError::NotConfirmed)?;
        self.cart.remove_ordered(session.cart());
        info!(
            session_id = %session.id(),
            remaining_lines = self.cart.len(),
            order_number = %confirmation.order_number,
            "Checkout completed"
        );
        Ok(confirmation)
    }
}
