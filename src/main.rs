//! Ticketing backend HTTP server.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use turnstile::config::Config;
use turnstile::confirmation::PaymentConfirmationGate;
use turnstile::issuance::IssuanceOrchestrator;
use turnstile::notifications::{run_worker, NotificationQueue};
use turnstile::providers::notifier::Notifier;
use turnstile::providers::{
    HttpArtifactRenderer, RazorpayGateway, SmtpNotifier, WhatsappNotifier,
};
use turnstile::redemption::RedemptionValidator;
use turnstile::router::build_router;
use turnstile::state::AppState;
use turnstile::stores::PostgresTicketStore;
use turnstile::token::TokenCodec;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticketing backend");

    // Load configuration
    let config = Config::from_env();
    info!(
        database_url = %config.database.url,
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // Connect to the store and run migrations
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .connect(&config.database.url)
        .await?;
    let store = Arc::new(PostgresTicketStore::new(pool));
    store.migrate().await?;
    info!("Database connected, migrations applied");

    // Token codec: one process-wide key, derived once
    let codec = Arc::new(TokenCodec::new(&config.ticket.token_secret));

    // External collaborators
    let gateway = Arc::new(RazorpayGateway::new(&config.gateway));
    let renderer = Arc::new(HttpArtifactRenderer::new(&config.renderer));
    let notifiers: Vec<Arc<dyn Notifier>> = vec![
        Arc::new(SmtpNotifier::new(&config.smtp)),
        Arc::new(WhatsappNotifier::new(&config.whatsapp)),
    ];

    // Deferred notification dispatch, off the request path
    let (notifications, jobs) =
        NotificationQueue::new(config.ticket.notification_queue_capacity);
    let worker = tokio::spawn(run_worker(jobs, notifiers));

    // Core components
    let orchestrator = IssuanceOrchestrator::new(renderer);
    let gate = Arc::new(PaymentConfirmationGate::new(
        store.clone(),
        codec.clone(),
        orchestrator,
        notifications.clone(),
    ));
    let validator = Arc::new(RedemptionValidator::new(store.clone(), codec));

    let state = AppState::new(store, gateway, gate, validator, notifications);
    let app = build_router(state, &config.server.allowed_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The queue's producers go away with the server; the worker drains
    // the remaining jobs and exits on its own.
    let _ = worker.await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => tracing::error!("failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
