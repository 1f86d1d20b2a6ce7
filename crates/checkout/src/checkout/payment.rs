//! Payment method selection.
//!
//! Payment is simulated: card data is captured for the review screen and
//! never sent anywhere. Card number and CVV are still held as secrets so they
//! cannot leak through `Debug` or logs.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Which payment method the shopper picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    CreditCard,
    DebitCard,
    Pix,
}

impl PaymentMethodKind {
    #[must_use]
    pub const fn is_card(self) -> bool {
        matches!(self, Self::CreditCard | Self::DebitCard)
    }

    /// Label shown to the shopper.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Cartão de crédito",
            Self::DebitCard => "Cartão de débito",
            Self::Pix => "Pix",
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCard => write!(f, "credit_card"),
            Self::DebitCard => write!(f, "debit_card"),
            Self::Pix => write!(f, "pix"),
        }
    }
}

impl FromStr for PaymentMethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            "pix" => Ok(Self::Pix),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// A card field required before review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Number,
    Expiry,
    Cvv,
    HolderName,
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Expiry => write!(f, "expiry"),
            Self::Cvv => write!(f, "cvv"),
            Self::HolderName => write!(f, "holder_name"),
        }
    }
}

/// Card data as typed by the shopper.
///
/// Implements `Debug` manually to redact the number and CVV.
#[derive(Clone)]
pub struct CardDetails {
    pub number: SecretString,
    /// `MM/AA` as typed.
    pub expiry: String,
    pub cvv: SecretString,
    pub holder_name: String,
}

impl CardDetails {
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
        holder_name: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::from(number.into()),
            expiry: expiry.into(),
            cvv: SecretString::from(cvv.into()),
            holder_name: holder_name.into(),
        }
    }

    /// Card details with every field blank.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("", "", "", "")
    }

    /// Fields that are blank after trimming, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<CardField> {
        [
            (CardField::Number, self.number.expose_secret()),
            (CardField::Expiry, self.expiry.as_str()),
            (CardField::Cvv, self.cvv.expose_secret()),
            (CardField::HolderName, self.holder_name.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Last four digits of the card number, if it has at least four.
    #[must_use]
    pub fn last4(&self) -> Option<String> {
        let digits: Vec<char> = self
            .number
            .expose_secret()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let start = digits.len().checked_sub(4)?;
        Some(digits.iter().skip(start).collect())
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .field("cvv", &"[REDACTED]")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// The selected payment method with any captured card data.
#[derive(Debug, Clone)]
pub enum PaymentMethodSelection {
    CreditCard(CardDetails),
    DebitCard(CardDetails),
    Pix,
}

impl PaymentMethodSelection {
    /// A fresh selection with blank card data.
    #[must_use]
    pub fn from_kind(kind: PaymentMethodKind) -> Self {
        match kind {
            PaymentMethodKind::CreditCard => Self::CreditCard(CardDetails::empty()),
            PaymentMethodKind::DebitCard => Self::DebitCard(CardDetails::empty()),
            PaymentMethodKind::Pix => Self::Pix,
        }
    }

    /// Switch to another method, carrying card data across card kinds.
    #[must_use]
    pub fn with_kind(self, kind: PaymentMethodKind) -> Self {
        match (self.into_card(), kind) {
            (Some(card), PaymentMethodKind::CreditCard) => Self::CreditCard(card),
            (Some(card), PaymentMethodKind::DebitCard) => Self::DebitCard(card),
            (_, kind) => Self::from_kind(kind),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PaymentMethodKind {
        match self {
            Self::CreditCard(_) => PaymentMethodKind::CreditCard,
            Self::DebitCard(_) => PaymentMethodKind::DebitCard,
            Self::Pix => PaymentMethodKind::Pix,
        }
    }

    #[must_use]
    pub const fn card(&self) -> Option<&CardDetails> {
        match self {
            Self::CreditCard(card) | Self::DebitCard(card) => Some(card),
            Self::Pix => None,
        }
    }

    fn into_card(self) -> Option<CardDetails> {
        match self {
            Self::CreditCard(card) | Self::DebitCard(card) => Some(card),
            Self::Pix => None,
        }
    }

    /// Review-step description, e.g. "Cartão de crédito final 1111".
    #[must_use]
    pub fn describe(&self) -> String {
        match self.card().and_then(CardDetails::last4) {
            Some(last4) => format!("{} final {last4}", self.kind().label()),
            None => self.kind().label().to_string(),
        }
    }
}
