//! Checkout simulation from a YAML scenario.
//!
//! # Scenario Format
//!
//! ```yaml
//! baseUrl: http://localhost:3000   # optional, else VETMART_API_BASE_URL
//! items:
//!   - entry:
//!       productId: 1
//!       outletId: 10
//!       name: Antipulgas
//!       unitPrice: "R$ 45,90"
//!       stock: 5
//!       imageRefs: ["/uploads/antipulgas.png"]
//!     quantity: 2
//! addresses:
//!   - id: 1
//!     label: Casa
//!     street: Rua das Flores
//!     number: "42"
//!     district: Centro
//!     city: Campinas
//!     state: SP
//!     zip: 13010-000
//!     isPrimary: true
//! payment:
//!   method: credit_card
//!   card:
//!     number: "4111 1111 1111 1111"
//!     expiry: "12/30"
//!     cvv: "123"
//!     holderName: Ana Souza
//! invoiceTaxId: 123.456.789-09
//! ```

use std::num::NonZeroU32;
use std::path::Path;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use vetmart_checkout::{
    CardDetails, CatalogEntry, CheckoutConfig, CheckoutStep, OrderConfirmationGenerator,
    PaymentMethodKind, ShopperStore,
};
use vetmart_core::{Address, TaxId};

/// Errors specific to scenario files.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read.
    #[error("Cannot read scenario {0}: {1}")]
    Read(String, std::io::Error),

    /// Scenario file is not valid YAML for a scenario.
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Unknown payment method name.
    #[error("Invalid payment method: {0}")]
    PaymentMethod(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    base_url: Option<String>,
    items: Vec<ScenarioItem>,
    #[serde(default)]
    addresses: Vec<Address>,
    payment: Option<ScenarioPayment>,
    invoice_tax_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScenarioItem {
    entry: CatalogEntry,
    quantity: Option<NonZeroU32>,
}

#[derive(Debug, Deserialize)]
struct ScenarioPayment {
    method: String,
    card: Option<ScenarioCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioCard {
    number: String,
    expiry: String,
    cvv: String,
    holder_name: String,
}

/// Run a scenario through cart, checkout and confirmation.
///
/// Prints the final checkout summary as JSON. The first step that rejects
/// the scenario's data aborts the run.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if an item cannot
/// be added to the cart, or if a checkout step is rejected.
#[allow(clippy::print_stdout)]
pub fn simulate(file_path: &str, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = load(Path::new(file_path))?;
    info!(path = %file_path, items = scenario.items.len(), "Loaded scenario");

    let config = match scenario.base_url.as_deref() {
        Some(base_url) => CheckoutConfig::new(base_url)?,
        None => CheckoutConfig::from_env()?,
    };
    let normalizer = config.catalog_normalizer();

    let mut store = ShopperStore::new();
    for address in scenario.addresses {
        store.addresses.upsert(address);
    }
    for item in &scenario.items {
        let line = normalizer.to_line_item(&item.entry, item.quantity)?;
        store.cart.add(line)?;
    }

    let generator = match seed {
        Some(seed) => OrderConfirmationGenerator::with_rng(StdRng::seed_from_u64(seed)),
        None => OrderConfirmationGenerator::new(),
    }
    .with_delivery_days(config.delivery_days);
    let mut session = store.begin_checkout_with_generator(generator)?;

    if let Some(payment) = scenario.payment {
        let kind: PaymentMethodKind = payment
            .method
            .parse()
            .map_err(ScenarioError::PaymentMethod)?;
        session.select_payment_method(kind)?;
        if let Some(card) = payment.card {
            session.set_card_details(CardDetails::new(
                card.number,
                card.expiry,
                card.cvv,
                card.holder_name,
            ))?;
        }
    }
    if let Some(tax_id) = scenario.invoice_tax_id.as_deref() {
        session.set_invoice_tax_id(TaxId::parse(tax_id)?)?;
    }

    while session.step() != CheckoutStep::Confirmation {
        session.advance(Utc::now())?;
    }

    println!("{}", serde_json::to_string_pretty(&session.summary())?);

    let confirmation = store.complete_checkout(session)?;
    info!(
        order_number = %confirmation.order_number,
        tracking_code = %confirmation.tracking_code,
        "Scenario completed"
    );
    Ok(())
}

fn load(path: &Path) -> Result<Scenario, ScenarioError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ScenarioError::Read(path.display().to_string(), e))?;
    Ok(serde_yaml::from_str(&content)?)
}
