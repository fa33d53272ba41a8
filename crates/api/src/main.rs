use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_api::config::ServerConfig;
use portfolio_api::relay::ChatRelay;
use portfolio_api::router::build_app_router;
use portfolio_api::state::AppState;
use portfolio_api::ws;
use portfolio_core::memory::MemoryStore;
use portfolio_db::PgStore;
use portfolio_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let ws_manager = Arc::new(ws::WsManager::new());
    let event_bus = Arc::new(EventBus::default());

    // --- Store ---
    let state = match &config.database_url {
        Some(database_url) => {
            let pool = portfolio_db::create_pool(database_url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            portfolio_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            portfolio_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            AppState::new(
                Arc::new(PgStore::new(pool)),
                config.clone(),
                Arc::clone(&ws_manager),
                Arc::clone(&event_bus),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            AppState::new(
                Arc::new(MemoryStore::new()),
                config.clone(),
                Arc::clone(&ws_manager),
                Arc::clone(&event_bus),
            )
        }
    };

    // --- Background tasks ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), ws::HEARTBEAT_INTERVAL);
    let relay = ChatRelay::new(Arc::clone(&ws_manager));
    let mut relay_handle = tokio::spawn(relay.run(event_bus.subscribe()));
    tracing::info!("Chat relay started");

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
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    // Open sockets still hold state clones; the relay ends once the last
    // bus handle is dropped, or is aborted after the drain timeout.
    drop(event_bus);
    if tokio::time::timeout(drain, &mut relay_handle).await.is_err() {
        tracing::warn!("Chat relay did not stop in time, aborting");
        relay_handle.abort();
    }

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
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
