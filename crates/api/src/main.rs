use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use millguard_db::{InMemoryStateStore, PgStateStore, StateStore};
use millguard_engine::{DecisionCore, MaintenanceScheduler, ModelPipeline, MonitorConfig};
use millguard_events::Dispatcher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use millguard_api::background;
use millguard_api::channels::channels_from_env;
use millguard_api::config::ServerConfig;
use millguard_api::router::build_app_router;
use millguard_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "millguard_api=debug,millguard_engine=debug,millguard_events=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let monitor = MonitorConfig::from_env().expect("Invalid monitor configuration");
    tracing::info!(
        classes = monitor.fault_classes.len(),
        threshold = monitor.normal_override_threshold,
        cooldown_secs = monitor.fault_cooldown.as_secs(),
        policy = ?monitor.store_failure_policy,
        "Loaded monitor configuration"
    );

    // --- State store ---
    let store: Arc<dyn StateStore> = match &config.database_url {
        Some(url) => {
            let pool = millguard_db::create_pool(url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            millguard_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            millguard_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStateStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory state store");
            Arc::new(InMemoryStateStore::new())
        }
    };

    // --- Classifier ---
    let model = ModelPipeline::from_path(&config.model_path)
        .await
        .expect("Failed to load classifier pipeline");
    assert_eq!(
        model.class_count(),
        monitor.fault_classes.len(),
        "Classifier class count does not match FAULT_CLASSES"
    );
    tracing::info!(path = %config.model_path, "Classifier pipeline loaded");

    // --- Notification channels ---
    let dispatcher = Dispatcher::new(channels_from_env(), monitor.channel_timeout);
    tracing::info!(channels = ?dispatcher.channel_names(), "Notification dispatcher ready");

    // --- Monitors ---
    let decision = Arc::new(DecisionCore::new(
        monitor.clone(),
        Arc::new(model),
        Arc::clone(&store),
        dispatcher.clone(),
    ));
    let maintenance = Arc::new(MaintenanceScheduler::new(
        monitor,
        Arc::clone(&store),
        dispatcher,
    ));

    // --- Background maintenance check ---
    let cancel = tokio_util::sync::CancellationToken::new();
    let check_handle = tokio::spawn(background::maintenance_check::run(
        Arc::clone(&maintenance),
        Duration::from_secs(config.maintenance_check_interval_secs),
        cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        decision,
        maintenance,
        store,
        config: Arc::new(config.clone()),
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

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), check_handle).await;
    tracing::info!("Maintenance check job stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM (on Unix).
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
