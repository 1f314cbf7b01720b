use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::TenantId;
use crate::modules::invoices::models::{CreateInvoiceRequest, InvoiceStatus};
use crate::modules::invoices::services::invoice_service::InvoiceService;
use crate::modules::ledger::InvoiceFilter;

/// Query parameters for listing invoices
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<InvoiceStatus>,
    pub lead_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a new invoice
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<Arc<InvoiceService>>,
    tenant_id: TenantId,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .create_invoice(&tenant_id.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(invoice))
}

/// Get invoice by ID
/// GET /invoices/{id}
pub async fn get_invoice(
    service: web::Data<Arc<InvoiceService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();
    let invoice = service.get_invoice(&tenant_id.0, &invoice_id).await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// List invoices for tenant
/// GET /invoices
pub async fn list_invoices(
    service: web::Data<Arc<InvoiceService>>,
    tenant_id: TenantId,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = InvoiceFilter {
        status: query.status,
        lead_id: query.lead_id,
        limit: query.limit,
        offset: query.offset,
    };

    let invoices = service.list_invoices(&tenant_id.0, filter).await?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Send an invoice to the client
/// POST /invoices/{id}/send
pub async fn send_invoice(
    service: web::Data<Arc<InvoiceService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();
    let invoice = service.send_invoice(&tenant_id.0, &invoice_id).await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}/send", web::post().to(send_invoice)),
    );
}
