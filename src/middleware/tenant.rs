use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::core::AppError;

/// Tenant scope for a request, taken from the `X-Tenant-Id` header.
///
/// Tenant administration and authentication live outside this service; the
/// upstream gateway is trusted to have resolved the tenant before the request
/// reaches the ledger.
#[derive(Debug, Clone)]
pub struct TenantId(pub String);

impl FromRequest for TenantId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let tenant = req
            .headers()
            .get("X-Tenant-Id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        ready(match tenant {
            Some(tenant_id) => Ok(TenantId(tenant_id)),
            None => Err(AppError::validation("Missing X-Tenant-Id header")),
        })
    }
}
