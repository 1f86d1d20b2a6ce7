//! Simulated order confirmation.
//!
//! Orders are not persisted or fulfilled; the confirmation screen shows a
//! locally generated order number, a postal-style tracking code and an
//! estimated delivery date. The generator issues at most one confirmation and
//! returns that same value on every later call.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default days between order and estimated delivery.
pub const DEFAULT_DELIVERY_DAYS: u32 = 7;

/// Longest delivery estimate the generator will issue.
pub const MAX_DELIVERY_DAYS: u32 = 60;

/// The confirmation artifact shown on the final checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// `yyyymmdd` of the order date followed by six random digits.
    pub order_number: String,
    /// `AA123456789BR` format.
    pub tracking_code: String,
    pub order_date: DateTime<Utc>,
    pub estimated_delivery_date: DateTime<Utc>,
}

/// Issues a single [`OrderConfirmation`] per checkout session.
pub struct OrderConfirmationGenerator {
    rng: StdRng,
    delivery_days: u32,
    issued: Option<OrderConfirmation>,
}

impl OrderConfirmationGenerator {
    /// Create a generator seeded from the thread RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a generator with an explicit RNG.
    #[must_use]
    pub const fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            delivery_days: DEFAULT_DELIVERY_DAYS,
            issued: None,
        }
    }

    /// Set the delivery estimate, clamped to `1..=MAX_DELIVERY_DAYS`.
    #[must_use]
    pub const fn with_delivery_days(mut self, delivery_days: u32) -> Self {
        self.delivery_days = if delivery_days == 0 {
            1
        } else if delivery_days > MAX_DELIVERY_DAYS {
            MAX_DELIVERY_DAYS
        } else {
            delivery_days
        };
        self
    }

    #[must_use]
    pub const fn delivery_days(&self) -> u32 {
        self.delivery_days
    }

    /// The confirmation already issued, if any.
    #[must_use]
    pub const fn issued(&self) -> Option<&OrderConfirmation> {
        self.issued.as_ref()
    }

    /// Issue the confirmation for an order placed at `now`.
    ///
    /// Only the first call generates; later calls return the first result
    /// regardless of `now`.
    pub fn generate(&mut self, now: DateTime<Utc>) -> OrderConfirmation {
        if let Some(issued) = &self.issued {
            return issued.clone();
        }

        let confirmation = OrderConfirmation {
            order_number: format!(
                "{}{:06}",
                now.format("%Y%m%d"),
                self.rng.random_range(0..1_000_000_u32)
            ),
            tracking_code: self.tracking_code(),
            order_date: now,
            estimated_delivery_date: now
                .checked_add_signed(Duration::days(i64::from(self.delivery_days)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        info!(
            order_number = %confirmation.order_number,
            tracking_code = %confirmation.tracking_code,
            "Issued order confirmation"
        );
        self.issued = Some(confirmation.clone());
        confirmation
    }

    fn tracking_code(&mut self) -> String {
        let prefix: String = (0..2)
            .map(|_| char::from(b'A' + self.rng.random_range(0..26_u8)))
            .collect();
        format!(
            "{prefix}{:09}BR",
            self.rng.random_range(0..1_000_000_000_u32)
        )
    }
}

impl Default for OrderConfirmationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderConfirmationGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderConfirmationGenerator")
            .field("delivery_days", &self.delivery_days)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
    }

    fn seeded(seed: u64) -> OrderConfirmationGenerator {
        OrderConfirmationGenerator::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_order_number_format() {
        let confirmation = seeded(1).generate(now());
        assert_eq!(confirmation.order_number.len(), 14);
        assert!(confirmation.order_number.starts_with("20261019"));
        assert!(confirmation.order_number.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_tracking_code_format() {
        let code = seeded(2).generate(now()).tracking_code;
        assert_eq!(code.len(), 13);
        assert!(code.ends_with("BR"));
        let bytes = code.as_bytes();
        assert!(bytes.iter().take(2).all(u8::is_ascii_uppercase));
        assert!(bytes.iter().skip(2).take(9).all(u8::is_ascii_digit));
    }

    #[test]
    fn test_estimated_delivery_is_seven_days_out() {
        let confirmation = seeded(3).generate(now());
        assert_eq!(confirmation.order_date, now());
        assert_eq!(
            confirmation.estimated_delivery_date,
            Utc.with_ymd_and_hms(2026, 10, 26, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_custom_delivery_days() {
        let confirmation = seeded(3).with_delivery_days(2).generate(now());
        assert_eq!(
            confirmation.estimated_delivery_date,
            Utc.with_ymd_and_hms(2026, 10, 21, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_delivery_days_are_clamped() {
        assert_eq!(seeded(5).with_delivery_days(u32::MAX).delivery_days(), MAX_DELIVERY_DAYS);
        assert_eq!(seeded(5).with_delivery_days(0).delivery_days(), 1);

        let confirmation = seeded(5).with_delivery_days(u32::MAX).generate(now());
        assert_eq!(
            confirmation.estimated_delivery_date,
            now() + Duration::days(i64::from(MAX_DELIVERY_DAYS))
        );
    }

    #[test]
    fn test_delivery_date_saturates_at_end_of_time() {
        let confirmation = seeded(6).generate(DateTime::<Utc>::MAX_UTC);
        assert_eq!(confirmation.estimated_delivery_date, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let mut generator = seeded(4);
        assert!(generator.issued().is_none());
        let first = generator.generate(now());
        let second = generator.generate(now() + Duration::hours(5));
        assert_eq!(first, second);
        assert_eq!(generator.issued(), Some(&first));
    }

    #[test]
    fn test_same_seed_same_confirmation() {
        assert_eq!(seeded(9).generate(now()), seeded(9).generate(now()));
    }

    #[test]
    fn test_default_generator_produces_valid_confirmation() {
        let confirmation = OrderConfirmationGenerator::new().generate(now());
        assert!(confirmation.tracking_code.ends_with("BR"));
    }
}
