//! PayLedger Billing Core Library
//!
//! Invoice and payment ledger for the business-management dashboard: invoice
//! totals, the payment ledger with per-payment fee breakdowns, and the
//! derived invoice lifecycle state.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::invoices;
pub use modules::ledger;
pub use modules::payments;
