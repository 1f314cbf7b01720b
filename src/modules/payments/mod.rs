// Payments module

pub mod controllers;
pub mod models;
pub mod services;

pub use models::{Payment, PaymentMethod, PaymentStatus};
pub use services::{FeeCalculator, PaymentService};
