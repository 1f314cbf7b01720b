pub mod tenant;

pub use tenant::TenantId;
