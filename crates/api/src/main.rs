use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use catalist_core::recognition::{CatRecognizer, ColorLayoutExtractor};
use catalist_events::{EmailConfig, EmailDelivery, EventBus, Notifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalist_api::bootstrap::ensure_admin;
use catalist_api::config::ServerConfig;
use catalist_api::router::build_app_router;
use catalist_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        static_dir = %config.static_dir.display(),
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = catalist_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    tracing::info!("Database connection pool created");

    catalist_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    catalist_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Bootstrap admin ---
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        ensure_admin(&pool, email, password)
            .await
            .expect("Failed to bootstrap admin account");
    }

    // --- Event bus + notifier ---
    let event_bus = Arc::new(EventBus::default());
    let mailer = match EmailConfig::from_env() {
        Some(email_config) => {
            Some(EmailDelivery::new(email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::info!("SMTP_HOST not set; notification emails will be logged only");
            None
        }
    };
    let notifier_handle = tokio::spawn(Notifier::new(mailer).run(event_bus.subscribe()));

    // --- App state ---
    let recognizer = CatRecognizer::new(
        Arc::new(ColorLayoutExtractor),
        config.recognition.hash_bits,
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        recognizer,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the last sender closes the channel and stops the notifier.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), notifier_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// `RUST_LOG` filters; `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalist_api=debug,catalist_events=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
