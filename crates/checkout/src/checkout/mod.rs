//! Multi-step checkout workflow.
//!
//! # Steps
//!
//! ```text
//! AddressAndPayment -> PaymentDetails -> Review -> Invoice -> Confirmation
//! ```
//!
//! Forward transitions go through [`CheckoutSession::advance`], which checks
//! the current step's guard:
//!
//! | From                | Requires                                        |
//! |---------------------|-------------------------------------------------|
//! | `AddressAndPayment` | primary address and a payment method            |
//! | `PaymentDetails`    | all card fields for card methods; nothing for Pix |
//! | `Review`            | nothing                                         |
//! | `Invoice`           | invoice tax id                                  |
//!
//! Entering `Confirmation` issues the order confirmation exactly once. A
//! failed guard leaves the session untouched and reports a [`StepError`].

mod payment;
mod session;
mod step;
mod summary;

pub use payment::{CardDetails, CardField, PaymentMethodKind, PaymentMethodSelection};
pub use session::{CheckoutSession, StepError};
pub use step::CheckoutStep;
pub use summary::{CheckoutSummary, SummaryLine};
