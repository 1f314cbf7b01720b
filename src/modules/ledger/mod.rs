// Ledger persistence: the store trait plus its MySQL and in-memory backends.

pub mod memory;
pub mod mysql;
pub mod store;

pub use memory::InMemoryLedgerStore;
pub use mysql::MySqlLedgerStore;
pub use store::{CommitOutcome, InvoiceFilter, LedgerStore};
