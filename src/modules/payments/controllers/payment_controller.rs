use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::TenantId;
use crate::modules::payments::models::RecordPaymentRequest;
use crate::modules::payments::services::payment_service::PaymentService;

/// Record a settled payment against an invoice
/// POST /invoices/{id}/payments
pub async fn record_payment(
    service: web::Data<Arc<PaymentService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();
    let result = service
        .record_payment(&tenant_id.0, &invoice_id, request.into_inner())
        .await?;

    // A duplicate submission is not an error; the prior result is returned
    if result.duplicate {
        Ok(HttpResponse::Ok().json(result))
    } else {
        Ok(HttpResponse::Created().json(result))
    }
}

/// List payments recorded against an invoice
/// GET /invoices/{id}/payments
pub async fn list_payments(
    service: web::Data<Arc<PaymentService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();
    let payments = service.list_payments(&tenant_id.0, &invoice_id).await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// Configure payment routes.
///
/// Registered before the invoice scope so these paths are matched ahead of
/// the broader `/invoices` prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/invoices/{id}/payments")
            .route(web::post().to(record_payment))
            .route(web::get().to(list_payments)),
    );
}
