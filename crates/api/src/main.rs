use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use emerald_api::config::ServerConfig;
use emerald_api::state::AppState;
use emerald_api::{app, background};
use emerald_core::reset_code::ResetCodeStore;
use emerald_mail::{DisabledMailer, EmailConfig, Mailer, SmtpMailer};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Connections kept in the pool.
const DB_MAX_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emerald_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = emerald_db::create_pool(&database_url, DB_MAX_CONNECTIONS)
        .await
        .expect("Failed to connect to database");

    emerald_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    emerald_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Mailer ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(&email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; password reset emails are disabled");
            Arc::new(DisabledMailer)
        }
    };

    // --- Reset codes + sweep ---
    let reset_codes = Arc::new(ResetCodeStore::new(chrono::Duration::minutes(
        config.reset_code_ttl_mins,
    )));
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(background::reset_code_sweep::run(
        Arc::clone(&reset_codes),
        Duration::from_secs(config.reset_sweep_interval_secs),
        sweep_cancel.clone(),
    ));

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState {
        pool,
        config: Arc::new(config),
        reset_codes,
        mailer,
    };

    let router = app::build_app(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
