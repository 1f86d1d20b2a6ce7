//! Unified error type for the checkout engine.
//!
//! Each module reports its own error enum; hosts that drive several of them
//! in one call chain can collect everything into [`Error`].

use thiserror::Error;
use vetmart_core::TaxIdError;

use crate::address::AddressError;
use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::StepError;
use crate::config::ConfigError;
use crate::price::PriceError;

/// Any failure raised by the checkout engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A price could not be parsed.
    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A catalog entry could not be turned into a line item.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An address book operation was rejected.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// A checkout transition or mutation was rejected.
    #[error("Checkout error: {0}")]
    Step(#[from] StepError),

    /// An invoice tax id was rejected.
    #[error("Tax id error: {0}")]
    TaxId(#[from] TaxIdError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for checkout engine operations.
pub type Result<T> = std::result::Result<T, Error>;
