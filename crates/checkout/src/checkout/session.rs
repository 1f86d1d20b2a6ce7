//! Checkout session and its guarded step transitions.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use vetmart_core::{Address, Money, TaxId};

use super::payment::{CardDetails, CardField, PaymentMethodKind, PaymentMethodSelection};
use super::step::CheckoutStep;
use super::summary::CheckoutSummary;
use crate::address::AddressBook;
use crate::cart::Cart;
use crate::confirmation::{OrderConfirmation, OrderConfirmationGenerator};

/// Why a checkout operation was rejected.
///
/// A rejected operation never modifies the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// Checkout cannot start with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// No shipping address; route the shopper to address creation.
    #[error("a primary shipping address is required")]
    MissingAddress,

    /// No payment method selected.
    #[error("a payment method must be selected")]
    MissingPaymentMethod,

    /// Card payment with blank fields.
    #[error("card details incomplete: missing {}", join_fields(.missing))]
    InvalidCardDetails { missing: Vec<CardField> },

    /// Card details given while Pix or nothing is selected.
    #[error("card details do not apply to the selected payment method")]
    CardDetailsNotApplicable,

    /// No tax id for the invoice.
    #[error("a tax id is required for the invoice")]
    MissingTaxId,

    /// Already at the first step.
    #[error("already at the first checkout step")]
    AtFirstStep,

    /// The order is confirmed; the session is read-only.
    #[error("order already confirmed")]
    AlreadyConfirmed,

    /// The session has not reached confirmation.
    #[error("order not confirmed yet")]
    NotConfirmed,
}

impl StepError {
    /// Stable identifier for the UI to map to a message or route.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::EmptyCart => "empty_cart",
            Self::MissingAddress => "missing_address",
            Self::MissingPaymentMethod => "missing_payment_method",
            Self::InvalidCardDetails { .. } => "invalid_card_details",
            Self::CardDetailsNotApplicable => "card_details_not_applicable",
            Self::MissingTaxId => "missing_tax_id",
            Self::AtFirstStep => "at_first_step",
            Self::AlreadyConfirmed => "already_confirmed",
            Self::NotConfirmed => "not_confirmed",
        }
    }

    /// Whether the shopper should be sent to the address form.
    #[must_use]
    pub const fn requires_address_creation(&self) -> bool {
        matches!(self, Self::MissingAddress)
    }
}

fn join_fields(fields: &[CardField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One pass through checkout, from a snapshot of the cart to confirmation.
///
/// The cart is copied when the session begins; later changes to the
/// shopper's cart do not affect an open session.
#[derive(Debug)]
pub struct CheckoutSession {
    id: Uuid,
    step: CheckoutStep,
    cart: Cart,
    address: Option<Address>,
    payment: Option<PaymentMethodSelection>,
    invoice_tax_id: Option<TaxId>,
    confirmation: Option<OrderConfirmation>,
    generator: OrderConfirmationGenerator,
}

impl CheckoutSession {
    /// Start checkout with the shopper's primary address preselected.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::EmptyCart`] if the cart has no lines.
    pub fn begin(cart: Cart, addresses: &AddressBook) -> Result<Self, StepError> {
        Self::begin_with_generator(cart, addresses, OrderConfirmationGenerator::new())
    }

    /// Start checkout with an explicit confirmation generator.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::EmptyCart`] if the cart has no lines.
    pub fn begin_with_generator(
        cart: Cart,
        addresses: &AddressBook,
        generator: OrderConfirmationGenerator,
    ) -> Result<Self, StepError> {
        if cart.is_empty() {
            return Err(StepError::EmptyCart);
        }
        let session = Self {
            id: Uuid::new_v4(),
            step: CheckoutStep::default(),
            cart,
            address: addresses.primary().cloned(),
            payment: None,
            invoice_tax_id: None,
            confirmation: None,
            generator,
        };
        info!(
            session_id = %session.id,
            lines = session.cart.len(),
            total = session.cart.total().minor(),
            has_address = session.address.is_some(),
            "Checkout started"
        );
        Ok(session)
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn total(&self) -> Money {
        self.cart.total()
    }

    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentMethodSelection> {
        self.payment.as_ref()
    }

    #[must_use]
    pub const fn invoice_tax_id(&self) -> Option<&TaxId> {
        self.invoice_tax_id.as_ref()
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.confirmation.is_some()
    }

    /// Re-read the primary address, e.g. after the shopper created one.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AlreadyConfirmed`] once the order is confirmed.
    pub fn use_primary_address(
        &mut self,
        addresses: &AddressBook,
    ) -> Result<Option<&Address>, StepError> {
        self.ensure_open()?;
        self.address = addresses.primary().cloned();
        debug!(
            session_id = %self.id,
            has_address = self.address.is_some(),
            "Refreshed shipping address"
        );
        Ok(self.address.as_ref())
    }

    /// Choose a payment method. Card data already typed is kept when
    /// switching between credit and debit.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AlreadyConfirmed`] once the order is confirmed.
    pub fn select_payment_method(&mut self, kind: PaymentMethodKind) -> Result<(), StepError> {
        self.ensure_open()?;
        self.payment = Some(match self.payment.take() {
            Some(current) => current.with_kind(kind),
            None => PaymentMethodSelection::from_kind(kind),
        });
        debug!(session_id = %self.id, method = %kind, "Selected payment method");
        Ok(())
    }

    /// Store card data for the selected card method.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::CardDetailsNotApplicable`] unless a card method
    /// is selected, or [`StepError::AlreadyConfirmed`] once confirmed.
    pub fn set_card_details(&mut self, details: CardDetails) -> Result<(), StepError> {
        self.ensure_open()?;
        self.payment = match self.payment.take() {
            Some(PaymentMethodSelection::CreditCard(_)) => {
                Some(PaymentMethodSelection::CreditCard(details))
            }
            Some(PaymentMethodSelection::DebitCard(_)) => {
                Some(PaymentMethodSelection::DebitCard(details))
            }
            other => {
                self.payment = other;
                return Err(StepError::CardDetailsNotApplicable);
            }
        };
        debug!(session_id = %self.id, "Stored card details");
        Ok(())
    }

    /// Store the invoice tax id.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AlreadyConfirmed`] once the order is confirmed.
    pub fn set_invoice_tax_id(&mut self, tax_id: TaxId) -> Result<(), StepError> {
        self.ensure_open()?;
        self.invoice_tax_id = Some(tax_id);
        debug!(session_id = %self.id, "Stored invoice tax id");
        Ok(())
    }

    /// Move to the next step if the current step's guard passes.
    ///
    /// Entering [`CheckoutStep::Confirmation`] issues the order confirmation.
    ///
    /// # Errors
    ///
    /// Returns the failed precondition; the session is left unchanged.
    #[instrument(skip(self, now), fields(session_id = %self.id, from = %self.step))]
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<CheckoutStep, StepError> {
        if let Err(e) = self.check_guard() {
            warn!(reason = e.reason_code(), "Checkout step rejected");
            return Err(e);
        }
        let next = self.step.next().ok_or(StepError::AlreadyConfirmed)?;

        if next.is_terminal() {
            self.confirmation = Some(self.generator.generate(now));
        }
        self.step = next;
        info!(to = %next, "Checkout advanced");
        Ok(next)
    }

    /// Move back one step. Entered data is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AtFirstStep`] at the first step and
    /// [`StepError::AlreadyConfirmed`] once confirmed.
    #[instrument(skip(self), fields(session_id = %self.id, from = %self.step))]
    pub fn previous(&mut self) -> Result<CheckoutStep, StepError> {
        self.ensure_open()?;
        let previous = self.step.previous().ok_or(StepError::AtFirstStep)?;
        self.step = previous;
        info!(to = %previous, "Checkout went back");
        Ok(previous)
    }

    /// Read-only projection for the review and confirmation screens.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::from_session(self)
    }

    fn check_guard(&self) -> Result<(), StepError> {
        match self.step {
            CheckoutStep::AddressAndPayment => {
                if self.address.is_none() {
                    return Err(StepError::MissingAddress);
                }
                if self.payment.is_none() {
                    return Err(StepError::MissingPaymentMethod);
                }
                Ok(())
            }
            CheckoutStep::PaymentDetails => {
                let payment = self
                    .payment
                    .as_ref()
                    .ok_or(StepError::MissingPaymentMethod)?;
                match payment.card().map(CardDetails::missing_fields) {
                    Some(missing) if !missing.is_empty() => {
                        Err(StepError::InvalidCardDetails { missing })
                    }
                    _ => Ok(()),
                }
            }
            CheckoutStep::Review => Ok(()),
            CheckoutStep::Invoice => self
                .invoice_tax_id
                .as_ref()
                .map(|_| ())
                .ok_or(StepError::MissingTaxId),
            CheckoutStep::Confirmation => Err(StepError::AlreadyConfirmed),
        }
    }

    const fn ensure_open(&self) -> Result<(), StepError> {
        if self.step.is_terminal() {
            Err(StepError::AlreadyConfirmed)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vetmart_core::{OutletId, ProductId};

    use super::*;
    use crate::address::tests::address;
    use crate::cart::NewLineItem;
    use crate::image::ResolvedImage;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(NewLineItem {
            product_id: ProductId::new(1),
            outlet_id: OutletId::new(10),
            name: "Vermífugo 4 comprimidos".to_string(),
            unit_price: Money::from_minor(4590),
            quantity: NonZeroU32::new(2),
            image: ResolvedImage::Unresolved,
        })
        .unwrap();
        cart
    }

    fn book() -> AddressBook {
        AddressBook::from_addresses(vec![address(1, true)]).unwrap()
    }

    fn session(addresses: &AddressBook) -> CheckoutSession {
        CheckoutSession::begin_with_generator(
            cart(),
            addresses,
            OrderConfirmationGenerator::with_rng(StdRng::seed_from_u64(42)),
        )
        .unwrap()
    }

    fn visa() -> CardDetails {
        CardDetails::new("4111111111111111", "12/29", "123", "Ana Souza")
    }

    fn tax_id() -> TaxId {
        TaxId::parse("123.456.789-09").unwrap()
    }

    /// Drive a session to the invoice step with a credit card.
    fn at_invoice() -> CheckoutSession {
        let mut session = session(&book());
        session.select_payment_method(PaymentMethodKind::CreditCard).unwrap();
        session.advance(now()).unwrap();
        session.set_card_details(visa()).unwrap();
        session.advance(now()).unwrap();
        session.advance(now()).unwrap();
        assert_eq!(session.step(), CheckoutStep::Invoice);
        session
    }

    #[test]
    fn test_begin_rejects_empty_cart() {
        let result = CheckoutSession::begin(Cart::new(), &book());
        assert_eq!(result.unwrap_err(), StepError::EmptyCart);
    }

    #[test]
    fn test_begin_preselects_primary_address() {
        let session = session(&book());
        assert_eq!(session.step(), CheckoutStep::AddressAndPayment);
        assert_eq!(session.address().unwrap().id.as_i64(), 1);
        assert_eq!(session.total(), Money::from_minor(9180));
    }

    #[test]
    fn test_missing_address_blocks_first_step() {
        let mut session = session(&AddressBook::new());
        session.select_payment_method(PaymentMethodKind::Pix).unwrap();
        let err = session.advance(now()).unwrap_err();
        assert_eq!(err, StepError::MissingAddress);
        assert!(err.requires_address_creation());
        assert_eq!(session.step(), CheckoutStep::AddressAndPayment);
    }

    #[test]
    fn test_address_created_later_unblocks() {
        let mut addresses = AddressBook::new();
        let mut session = session(&addresses);
        session.select_payment_method(PaymentMethodKind::Pix).unwrap();
        assert!(session.advance(now()).is_err());

        addresses.upsert(address(5, false));
        assert!(session.use_primary_address(&addresses).unwrap().is_some());
        assert_eq!(session.advance(now()).unwrap(), CheckoutStep::PaymentDetails);
    }

    #[test]
    fn test_missing_payment_method_blocks_first_step() {
        let mut session = session(&book());
        assert_eq!(
            session.advance(now()).unwrap_err(),
            StepError::MissingPaymentMethod
        );
    }

    #[test]
    fn test_card_fields_required() {
        let mut session = session(&book());
        session.select_payment_method(PaymentMethodKind::DebitCard).unwrap();
        session.advance(now()).unwrap();

        let err = session.advance(now()).unwrap_err();
        assert_eq!(err.reason_code(), "invalid_card_details");
        assert_eq!(session.step(), CheckoutStep::PaymentDetails);

        session
            .set_card_details(CardDetails::new("5555444433331111", "", "321", "João"))
            .unwrap();
        assert_eq!(
            session.advance(now()).unwrap_err(),
            StepError::InvalidCardDetails {
                missing: vec![CardField::Expiry]
            }
        );

        session.set_card_details(visa()).unwrap();
        assert_eq!(session.advance(now()).unwrap(), CheckoutStep::Review);
    }

    #[test]
    fn test_pix_needs_no_details() {
        let mut session = session(&book());
        session.select_payment_method(PaymentMethodKind::Pix).unwrap();
        session.advance(now()).unwrap();
        assert_eq!(session.advance(now()).unwrap(), CheckoutStep::Review);
    }

    #[test]
    fn test_card_details_rejected_for_pix() {
        let mut session = session(&book());
        assert_eq!(
            session.set_card_details(visa()).unwrap_err(),
            StepError::CardDetailsNotApplicable
        );
        session.select_payment_method(PaymentMethodKind::Pix).unwrap();
        assert_eq!(
            session.set_card_details(visa()).unwrap_err(),
            StepError::CardDetailsNotApplicable
        );
        assert_eq!(session.payment().unwrap().kind(), PaymentMethodKind::Pix);
    }

    #[test]
    fn test_tax_id_required_for_confirmation() {
        let mut session = at_invoice();
        assert_eq!(session.advance(now()).unwrap_err(), StepError::MissingTaxId);
        assert!(session.confirmation().is_none());

        session.set_invoice_tax_id(tax_id()).unwrap();
        assert_eq!(session.advance(now()).unwrap(), CheckoutStep::Confirmation);
        let confirmation = session.confirmation().unwrap();
        assert!(confirmation.tracking_code.ends_with("BR"));
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut session = at_invoice();
        session.set_invoice_tax_id(tax_id()).unwrap();
        session.advance(now()).unwrap();
        let confirmation = session.confirmation().cloned().unwrap();

        assert_eq!(session.advance(now()).unwrap_err(), StepError::AlreadyConfirmed);
        assert_eq!(session.previous().unwrap_err(), StepError::AlreadyConfirmed);
        assert_eq!(
            session.set_invoice_tax_id(tax_id()).unwrap_err(),
            StepError::AlreadyConfirmed
        );
        assert_eq!(
            session.select_payment_method(PaymentMethodKind::Pix).unwrap_err(),
            StepError::AlreadyConfirmed
        );
        assert_eq!(session.confirmation(), Some(&confirmation));
        assert!(session.is_confirmed());
    }

    #[test]
    fn test_previous_keeps_entered_data() {
        let mut session = at_invoice();
        session.set_invoice_tax_id(tax_id()).unwrap();

        assert_eq!(session.previous().unwrap(), CheckoutStep::Review);
        assert_eq!(session.previous().unwrap(), CheckoutStep::PaymentDetails);
        assert_eq!(session.previous().unwrap(), CheckoutStep::AddressAndPayment);
        assert_eq!(session.previous().unwrap_err(), StepError::AtFirstStep);

        assert!(session.invoice_tax_id().is_some());
        assert!(session.payment().unwrap().card().unwrap().missing_fields().is_empty());

        for _ in 0..4 {
            session.advance(now()).unwrap();
        }
        assert_eq!(session.step(), CheckoutStep::Confirmation);
    }

    #[test]
    fn test_switching_card_kind_keeps_details() {
        let mut session = session(&book());
        session.select_payment_method(PaymentMethodKind::CreditCard).unwrap();
        session.set_card_details(visa()).unwrap();
        session.select_payment_method(PaymentMethodKind::DebitCard).unwrap();
        assert!(session.payment().unwrap().card().unwrap().missing_fields().is_empty());
    }

    #[test]
    fn test_failed_guard_is_idempotent() {
        let mut session = session(&AddressBook::new());
        for _ in 0..3 {
            assert_eq!(session.advance(now()).unwrap_err(), StepError::MissingAddress);
        }
        assert_eq!(session.step(), CheckoutStep::AddressAndPayment);
        assert!(session.payment().is_none());
        assert!(session.confirmation().is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(session(&book()).id(), session(&book()).id());
    }
}
