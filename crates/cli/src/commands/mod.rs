pub mod checkout;
pub mod image;
pub mod price;
