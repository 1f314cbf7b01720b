// Settlement webhook relay. The external gateway notifies this endpoint once
// a payment has settled; the body is authenticated with an HMAC-SHA256
// signature over the raw bytes before anything is parsed or recorded.
// Gateways retry webhooks, so the underlying recording is idempotent per
// transaction reference.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, warn};

use crate::config::WebhookConfig;
use crate::core::error::AppError;
use crate::modules::payments::models::{PaymentMethod, RecordPaymentRequest};
use crate::modules::payments::services::payment_service::PaymentService;

type HmacSha256 = Hmac<Sha256>;

/// Settlement notification relayed by the payment gateway
#[derive(Debug, Deserialize)]
pub struct SettlementNotification {
    pub tenant_id: String,
    pub invoice_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: String,
}

/// Process a gateway settlement notification
/// POST /webhooks/payments
pub async fn process_settlement(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<Arc<PaymentService>>,
    config: web::Data<WebhookConfig>,
) -> Result<HttpResponse, AppError> {
    verify_signature(&req, &body, &config.secret)?;

    let notification: SettlementNotification = serde_json::from_slice(&body)?;

    info!(
        tenant_id = notification.tenant_id.as_str(),
        invoice_id = notification.invoice_id.as_str(),
        transaction_id = notification.transaction_id.as_str(),
        "Received settlement notification"
    );

    let result = service
        .record_payment(
            &notification.tenant_id,
            &notification.invoice_id,
            RecordPaymentRequest {
                amount: notification.amount,
                method: notification.method,
                external_transaction_id: notification.transaction_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Verify the HMAC-SHA256 signature carried in `X-Webhook-Signature`
fn verify_signature(req: &HttpRequest, body: &[u8], secret: &str) -> Result<(), AppError> {
    let signature = req
        .headers()
        .get("X-Webhook-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::validation("Missing X-Webhook-Signature header"))?;

    let expected = hex::decode(signature)
        .map_err(|_| AppError::validation("Malformed webhook signature"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::internal("Invalid webhook secret"))?;
    mac.update(body);

    mac.verify_slice(&expected).map_err(|_| {
        warn!("Webhook signature verification failed");
        AppError::validation("Webhook signature verification failed")
    })
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhooks").route("/payments", web::post().to(process_settlement)),
    );
}
