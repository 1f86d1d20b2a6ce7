//! Price normalization for pt-BR formatted amounts.
//!
//! Catalog prices arrive in several shapes depending on which backend endpoint
//! produced them: locale strings (`"R$ 1.234,56"`), bare decimal columns
//! (`"45.90"`) or JSON numbers in reais (`45.9`). Everything is converted to
//! integer centavos ([`Money`]) before it touches a total.
//!
//! # Dot handling
//!
//! A dot is a thousands separator when every group after it has exactly three
//! digits (`"1.234"`, `"1.234.567,00"`). Without a comma, a single dot followed
//! by one or two digits is a decimal point (`"45.90"`). Any other shape is
//! malformed.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use vetmart_core::Money;

use crate::cart::LineItem;

/// Currency symbol shown in front of formatted amounts.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Errors that can occur when parsing a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The input is not a non-negative amount in a recognized format.
    #[error("malformed price: {input:?}")]
    Malformed {
        /// The raw input, for diagnostics.
        input: String,
    },
}

impl PriceError {
    fn malformed(input: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
        }
    }
}

/// A price as delivered by the backend: a locale string or a plain number
/// already in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawPrice {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// How malformed prices are treated when normalizing catalog data.
///
/// The storefront app this engine replaces priced unparsable catalog values
/// at zero and carried on. That silently discounts an order, so the default
/// here is [`PricePolicy::Strict`], which surfaces the error instead. Hosts
/// that need the app's old behavior select [`PricePolicy::Lenient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Malformed prices are rejected with [`PriceError::Malformed`].
    #[default]
    Strict,
    /// Malformed prices degrade to zero and are logged.
    Lenient,
}

impl PricePolicy {
    /// Normalize a raw price under this policy.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Malformed`] under [`PricePolicy::Strict`] if the
    /// input cannot be parsed. Never fails under [`PricePolicy::Lenient`].
    pub fn apply(self, raw: &RawPrice) -> Result<Money, PriceError> {
        match self {
            Self::Strict => parse(raw),
            Self::Lenient => Ok(parse_lenient(raw)),
        }
    }
}

impl std::fmt::Display for PricePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for PricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("invalid price policy: {other}")),
        }
    }
}

/// Parse a raw price into minor units.
///
/// Fractions beyond two digits are rounded half away from zero.
///
/// ```
/// use vetmart_checkout::price::{self, RawPrice};
/// use vetmart_core::Money;
///
/// assert_eq!(price::parse(&"R$ 45,90".into()).unwrap(), Money::from_minor(4590));
/// assert_eq!(price::parse(&"1.234,56".into()).unwrap(), Money::from_minor(123_456));
/// assert_eq!(price::parse(&RawPrice::Number(149.9)).unwrap(), Money::from_minor(14990));
/// assert!(price::parse(&"abc".into()).is_err());
/// ```
///
/// # Errors
///
/// Returns [`PriceError::Malformed`] for empty, negative, non-finite or
/// otherwise unrecognized input.
pub fn parse(raw: &RawPrice) -> Result<Money, PriceError> {
    match raw {
        RawPrice::Number(value) => parse_number(*value),
        RawPrice::Text(text) => parse_text(text),
    }
}

/// Parse a raw price, degrading malformed input to zero.
///
/// This keeps a single bad catalog row from breaking a whole cart, at the
/// cost of silently pricing that row at zero. Every fallback is logged.
pub fn parse_lenient(raw: &RawPrice) -> Money {
    parse(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Malformed price degraded to zero");
        Money::ZERO
    })
}

/// Format an amount with pt-BR conventions: `.` thousands grouping, `,`
/// decimal separator, always two fraction digits.
///
/// ```
/// use vetmart_checkout::price;
/// use vetmart_core::Money;
///
/// assert_eq!(price::format(Money::from_minor(24170)), "241,70");
/// assert_eq!(price::format(Money::from_minor(123_456_789)), "1.234.567,89");
/// ```
#[must_use]
pub fn format(amount: Money) -> String {
    let minor = amount.minor();
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{},{:02}", group_thousands(abs / 100), abs % 100)
}

/// Format an amount with the currency symbol (`R$ 241,70`).
#[must_use]
pub fn format_with_symbol(amount: Money) -> String {
    format!("{CURRENCY_SYMBOL} {}", format(amount))
}

/// Total of `unit_price × quantity` over the given lines.
///
/// Integer arithmetic only. A [`Cart`](crate::cart::Cart) guarantees its total
/// fits in an `i64`; use [`checked_sum`] for lines from anywhere else.
#[must_use]
pub fn sum<'a>(lines: impl IntoIterator<Item = &'a LineItem>) -> Money {
    lines.into_iter().map(LineItem::subtotal_unchecked).sum()
}

/// Like [`sum`], but returns `None` if any product or partial sum overflows.
#[must_use]
pub fn checked_sum<'a>(lines: impl IntoIterator<Item = &'a LineItem>) -> Option<Money> {
    lines.into_iter().try_fold(Money::ZERO, |total, line| {
        total.checked_add(line.subtotal()?)
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_number(value: f64) -> Result<Money, PriceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PriceError::malformed(value.to_string()));
    }
    // `f64` display is the shortest exact round-trip form, so 45.9 parses as
    // 45.9 rather than 45.899999999999998578...
    let text = value.to_string();
    let decimal = Decimal::from_str(&text).map_err(|_| PriceError::malformed(text.as_str()))?;
    to_minor(decimal).ok_or_else(|| PriceError::malformed(text))
}

fn parse_text(input: &str) -> Result<Money, PriceError> {
    let body = strip_currency_prefix(input);
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return Err(PriceError::malformed(input));
    }

    canonicalize(body)
        .and_then(|canonical| Decimal::from_str(&canonical).ok())
        .and_then(to_minor)
        .ok_or_else(|| PriceError::malformed(input))
}

fn strip_currency_prefix(input: &str) -> &str {
    let trimmed = input.trim();
    let without_symbol = trimmed
        .strip_prefix(CURRENCY_SYMBOL)
        .or_else(|| trimmed.strip_prefix("r$"))
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);
    // char::is_whitespace covers the non-breaking space Intl formatting emits
    without_symbol.trim()
}

/// Rewrite a locale amount as a plain `1234.56` decimal string.
fn canonicalize(body: &str) -> Option<String> {
    let (integer, fraction) = match body.rsplit_once(',') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => match body.split_once('.') {
            Some((integer, fraction))
                if !fraction.contains('.') && (1..=2).contains(&fraction.len()) =>
            {
                (integer, Some(fraction))
            }
            _ => (body, None),
        },
    };

    let digits = strip_grouping(integer)?;
    match fraction {
        Some(fraction) if fraction.is_empty() || !is_digits(fraction) => None,
        Some(fraction) => Some(format!("{digits}.{fraction}")),
        None => Some(digits),
    }
}

/// Remove `.` thousands separators, checking the grouping is well-formed.
fn strip_grouping(integer: &str) -> Option<String> {
    let mut groups = integer.split('.');
    let head = groups.next().filter(|head| is_digits(head))?;
    let mut digits = head.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
        grouped = true;
    }
    if grouped && head.len() > 3 {
        return None;
    }
    Some(digits)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn to_minor(value: Decimal) -> Option<Money> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
        .map(Money::from_minor)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
