//! Review-step projection of a checkout session.

use serde::Serialize;

use super::session::CheckoutSession;
use super::step::CheckoutStep;
use crate::cart::LineItem;
use crate::confirmation::OrderConfirmation;
use crate::price;

/// One cart line as shown on the review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub image: Option<String>,
}

impl From<&LineItem> for SummaryLine {
    fn from(line: &LineItem) -> Self {
        Self {
            name: line.name().to_string(),
            quantity: line.quantity().get(),
            unit_price: price::format_with_symbol(line.unit_price()),
            subtotal: line
                .subtotal()
                .map_or_else(String::new, price::format_with_symbol),
            image: line.image().url().map(ToString::to_string),
        }
    }
}

/// Everything the review and confirmation screens display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub step: CheckoutStep,
    pub lines: Vec<SummaryLine>,
    pub item_count: u64,
    pub total: String,
    pub address: Option<String>,
    pub payment: Option<String>,
    pub invoice_tax_id: Option<String>,
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutSummary {
    pub(crate) fn from_session(session: &CheckoutSession) -> Self {
        let cart = session.cart();
        Self {
            step: session.step(),
            lines: cart.iter().map(SummaryLine::from).collect(),
            item_count: cart.item_count(),
            total: price::format_with_symbol(cart.total()),
            address: session.address().map(vetmart_core::Address::one_line),
            payment: session.payment().map(|p| p.describe()),
            invoice_tax_id: session.invoice_tax_id().map(ToString::to_string),
            confirmation: session.confirmation().cloned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use vetmart_core::{Money, OutletId, ProductId};

    use super::*;
    use crate::address::AddressBook;
    use crate::address::tests::address;
    use crate::cart::{Cart, NewLineItem};
    use crate::checkout::{CardDetails, PaymentMethodKind};
    use crate::image::ResolvedImage;

    #[test]
    fn test_summary_formats_lines_and_total() {
        let mut cart = Cart::new();
        cart.add(NewLineItem {
            product_id: ProductId::new(1),
            outlet_id: OutletId::new(10),
            name: "Antipulgas".to_string(),
            unit_price: Money::from_minor(4590),
            quantity: NonZeroU32::new(2),
            image: ResolvedImage::Absolute("http://h:3000/uploads/a.png".to_string()),
        })
        .unwrap();
        cart.add(NewLineItem {
            product_id: ProductId::new(2),
            outlet_id: OutletId::new(10),
            name: "Ração".to_string(),
            unit_price: Money::from_minor(14990),
            quantity: None,
            image: ResolvedImage::Unresolved,
        })
        .unwrap();

        let book = AddressBook::from_addresses(vec![address(1, true)]).unwrap();
        let mut session = CheckoutSession::begin(cart, &book).unwrap();
        session.select_payment_method(PaymentMethodKind::CreditCard).unwrap();
        session
            .set_card_details(CardDetails::new("4111 1111 1111 1234", "01/30", "999", "Ana"))
            .unwrap();

        let summary = session.summary();
        assert_eq!(summary.step, CheckoutStep::AddressAndPayment);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, "R$ 241,70");
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines.first().unwrap().subtotal, "R$ 91,80");
        assert_eq!(
            summary.lines.first().unwrap().image.as_deref(),
            Some("http://h:3000/uploads/a.png")
        );
        assert!(summary.lines.last().unwrap().image.is_none());
        assert_eq!(summary.payment.as_deref(), Some("Cartão de crédito final 1234"));
        assert!(summary.address.unwrap().starts_with("Rua das Acácias, 1"));
        assert!(summary.confirmation.is_none());
    }
}
