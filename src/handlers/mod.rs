//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the store.

mod commands;
mod service_handler;
mod transfer_handler;
mod user_handler;

#[cfg(test)]
mod tests;

pub use commands::*;
pub use service_handler::ServiceHandler;
pub use transfer_handler::{TransferHandler, TransferPolicy};
pub use user_handler::UserHandler;
