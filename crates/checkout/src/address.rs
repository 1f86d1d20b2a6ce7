//! Shopper address book.
//!
//! At most one address is primary at any time. Checkout reads the primary
//! address as the shipping destination.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vetmart_core::{Address, AddressId};

/// Errors that can occur when managing the address book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address {0} not found")]
    NotFound(AddressId),

    #[error("address {0} appears more than once")]
    DuplicateId(AddressId),

    #[error("more than one primary address: {0} and {1}")]
    MultiplePrimary(AddressId, AddressId),
}

/// The shopper's saved addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addresses: Vec::new(),
        }
    }

    /// Build a book from the address API response.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DuplicateId`] or
    /// [`AddressError::MultiplePrimary`] if the set violates the book's
    /// invariants.
    pub fn from_addresses(addresses: Vec<Address>) -> Result<Self, AddressError> {
        let mut primary: Option<AddressId> = None;
        for (i, address) in addresses.iter().enumerate() {
            if addresses.iter().skip(i + 1).any(|other| other.id == address.id) {
                return Err(AddressError::DuplicateId(address.id));
            }
            if address.is_primary {
                if let Some(existing) = primary {
                    return Err(AddressError::MultiplePrimary(existing, address.id));
                }
                primary = Some(address.id);
            }
        }
        Ok(Self { addresses })
    }

    /// The shipping destination, if one is set.
    #[must_use]
    pub fn primary(&self) -> Option<&Address> {
        self.addresses.iter().find(|address| address.is_primary)
    }

    /// Insert or replace an address.
    ///
    /// A primary address demotes the previous primary. The first address in
    /// an empty book becomes primary. Replacing the current primary keeps it
    /// primary; use [`AddressBook::set_primary`] to move the flag.
    pub fn upsert(&mut self, mut address: Address) {
        let was_primary = self.get(address.id).is_some_and(|a| a.is_primary);
        address.is_primary = address.is_primary || was_primary || self.addresses.is_empty();

        if address.is_primary {
            for other in &mut self.addresses {
                other.is_primary = false;
            }
        }

        debug!(address_id = %address.id, primary = address.is_primary, "Upserted address");
        match self.addresses.iter_mut().find(|a| a.id == address.id) {
            Some(existing) => *existing = address,
            None => self.addresses.push(address),
        }
    }

    /// Make the given address the primary one.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] for an unknown id.
    pub fn set_primary(&mut self, id: AddressId) -> Result<(), AddressError> {
        if self.get(id).is_none() {
            return Err(AddressError::NotFound(id));
        }
        for address in &mut self.addresses {
            address.is_primary = address.id == id;
        }
        debug!(address_id = %id, "Set primary address");
        Ok(())
    }

    /// Remove an address. Removing the primary promotes the first remaining
    /// address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] for an unknown id.
    pub fn remove(&mut self, id: AddressId) -> Result<Address, AddressError> {
        let index = self
            .addresses
            .iter()
            .position(|address| address.id == id)
            .ok_or(AddressError::NotFound(id))?;
        let removed = self.addresses.remove(index);
        if removed.is_primary {
            if let Some(first) = self.addresses.first_mut() {
                first.is_primary = true;
                debug!(address_id = %first.id, "Promoted address to primary");
            }
        }
        Ok(removed)
    }

    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|address| address.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl TryFrom<Vec<Address>> for AddressBook {
    type Error = AddressError;

    fn try_from(addresses: Vec<Address>) -> Result<Self, Self::Error> {
        Self::from_addresses(addresses)
    }
}

impl From<AddressBook> for Vec<Address> {
    fn from(book: AddressBook) -> Self {
        book.addresses
    }
}
