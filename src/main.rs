use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payledger::config::Config;
use payledger::modules::invoices::controllers::invoice_controller;
use payledger::modules::invoices::InvoiceService;
use payledger::modules::ledger::{LedgerStore, MySqlLedgerStore};
use payledger::modules::payments::controllers::{payment_controller, webhook_controller};
use payledger::modules::payments::{FeeCalculator, PaymentService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payledger=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting PayLedger Billing Core");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Wire services over the MySQL ledger store
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(db_pool));
    let invoice_service = Arc::new(InvoiceService::new(
        store.clone(),
        config.billing.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        store.clone(),
        FeeCalculator::new(config.fees.clone()),
    ));
    let webhook_config = config.webhook.clone();

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(invoice_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(webhook_config.clone()))
            .service(
                web::scope("/api/v1")
                    .configure(payment_controller::configure)
                    .configure(invoice_controller::configure)
                    .configure(webhook_controller::configure),
            )
            .route("/health", web::get().to(health_check))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "payledger"
    }))
}
