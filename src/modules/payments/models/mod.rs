mod dto;
mod payment;

pub use dto::{PaymentResponse, RecordPaymentRequest, RecordPaymentResponse};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
