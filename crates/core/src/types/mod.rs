//! Core types for VetMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod money;
pub mod tax_id;

pub use address::Address;
pub use id::*;
pub use money::Money;
pub use tax_id::{TaxId, TaxIdError};
