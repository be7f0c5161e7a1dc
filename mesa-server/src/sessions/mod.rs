//! Session Registry
//!
//! Ephemeral QR-validated table sessions and the customer operations that
//! run inside them.

mod customer;
mod registry;

pub use customer::CustomerService;
pub use registry::SessionRegistry;
