//! Checkout steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A step of the checkout workflow, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Shipping address and payment method choice.
    #[default]
    AddressAndPayment,
    /// Card data entry (skipped in substance for Pix).
    PaymentDetails,
    /// Read-only order review.
    Review,
    /// Tax id for the invoice.
    Invoice,
    /// Terminal: order number and tracking code shown.
    Confirmation,
}

impl CheckoutStep {
    /// All steps in workflow order.
    pub const ALL: [Self; 5] = [
        Self::AddressAndPayment,
        Self::PaymentDetails,
        Self::Review,
        Self::Invoice,
        Self::Confirmation,
    ];

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::AddressAndPayment => Some(Self::PaymentDetails),
            Self::PaymentDetails => Some(Self::Review),
            Self::Review => Some(Self::Invoice),
            Self::Invoice => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::AddressAndPayment => None,
            Self::PaymentDetails => Some(Self::AddressAndPayment),
            Self::Review => Some(Self::PaymentDetails),
            Self::Invoice => Some(Self::Review),
            Self::Confirmation => Some(Self::Invoice),
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmation)
    }

    /// 1-based position for "step 2 of 5" indicators.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::AddressAndPayment => 1,
            Self::PaymentDetails => 2,
            Self::Review => 3,
            Self::Invoice => 4,
            Self::Confirmation => 5,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddressAndPayment => "address_and_payment",
            Self::PaymentDetails => "payment_details",
            Self::Review => "review",
            Self::Invoice => "invoice",
            Self::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}
