mod dto;
mod invoice;
mod line_item;

pub use dto::{CreateInvoiceRequest, CreateLineItemRequest, InvoiceResponse, LineItemResponse};
pub use invoice::{Invoice, InvoiceStatus};
pub use line_item::LineItem;
