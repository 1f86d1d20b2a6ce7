//! Shipping address type.

use serde::{Deserialize, Serialize};

use crate::AddressId;

/// A shopper's shipping address, as returned by the address API.
///
/// Exactly one address in a shopper's set may be primary. That invariant is
/// owned by the address book, not by this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    /// Shopper-chosen label ("Casa", "Clínica").
    pub label: String,
    pub street: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    /// Two-letter state code (e.g., "SP").
    pub state: String,
    pub zip: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl Address {
    /// Single-line rendering used on the review step.
    ///
    /// ```
    /// # use vetmart_core::{Address, AddressId};
    /// let address = Address {
    ///     id: AddressId::new(1),
    ///     label: "Casa".to_string(),
    ///     street: "Rua das Flores".to_string(),
    ///     number: "120".to_string(),
    ///     complement: Some("apto 12".to_string()),
    ///     district: "Centro".to_string(),
    ///     city: "Campinas".to_string(),
    ///     state: "SP".to_string(),
    ///     zip: "13010-000".to_string(),
    ///     is_primary: true,
    /// };
    /// assert_eq!(
    ///     address.one_line(),
    ///     "Rua das Flores, 120, apto 12 - Centro, Campinas/SP - 13010-000"
    /// );
    /// ```
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut line = format!("{}, {}", self.street, self.number);
        if let Some(complement) = self.complement.as_deref().filter(|c| !c.trim().is_empty()) {
            line.push_str(", ");
            line.push_str(complement);
        }
        format!(
            "{line} - {}, {}/{} - {}",
            self.district, self.city, self.state, self.zip
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_without_complement() {
        let json = r#"{
            "id": 9,
            "label": "Clínica",
            "street": "Av. Brasil",
            "number": "1500",
            "district": "Jardim América",
            "city": "São Paulo",
            "state": "SP",
            "zip": "01430-001",
            "isPrimary": true
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.id, AddressId::new(9));
        assert!(address.is_primary);
        assert!(address.complement.is_none());
    }

    #[test]
    fn test_one_line_skips_blank_complement() {
        let address = Address {
            id: AddressId::new(1),
            label: "Casa".to_string(),
            street: "Rua A".to_string(),
            number: "1".to_string(),
            complement: Some("  ".to_string()),
            district: "Centro".to_string(),
            city: "Recife".to_string(),
            state: "PE".to_string(),
            zip: "50000-000".to_string(),
            is_primary: false,
        };
        assert_eq!(address.one_line(), "Rua A, 1 - Centro, Recife/PE - 50000-000");
    }
}
