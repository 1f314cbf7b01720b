pub mod invoices;
pub mod ledger;
pub mod payments;
