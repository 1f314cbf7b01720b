// Invoices module

pub mod controllers;
pub mod models;
pub mod services;

pub use models::{Invoice, InvoiceStatus, LineItem};
pub use services::InvoiceService;
