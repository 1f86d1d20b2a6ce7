//! Price normalization commands.

use tracing::debug;
use vetmart_checkout::price::{self, PricePolicy, RawPrice};
use vetmart_core::Money;

/// Parse a raw price and print its minor units and display form.
///
/// # Errors
///
/// Returns an error if the price is malformed and `lenient` is not set.
#[allow(clippy::print_stdout)]
pub fn parse(input: &str, lenient: bool) -> Result<(), Box<dyn std::error::Error>> {
    let policy = if lenient {
        PricePolicy::Lenient
    } else {
        PricePolicy::Strict
    };
    debug!(%policy, input, "Parsing price");

    let amount = policy.apply(&RawPrice::from(input))?;
    println!("{}\t{}", amount.minor(), price::format_with_symbol(amount));
    Ok(())
}

/// Print an amount in minor units with the currency symbol.
#[allow(clippy::print_stdout)]
pub fn format(minor: i64) {
    println!("{}", price::format_with_symbol(Money::from_minor(minor)));
}
