use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_api::config::{ServerConfig, StoreBackend};
use marquee_api::router::build_app_router;
use marquee_api::state::AppState;
use marquee_db::repositories::MovieRepo;
use marquee_db::store::{MemoryMovieStore, MovieStore, PgMovieStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,marquee_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.store_backend,
        "Loaded server configuration"
    );

    // --- Store ---
    let store: Arc<dyn MovieStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

            let pool = marquee_db::create_pool(&database_url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            marquee_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            marquee_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgMovieStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; movies will not survive a restart");
            Arc::new(MemoryMovieStore::new())
        }
    };

    // --- App state ---
    let movies = MovieRepo::with_timeout(store, Duration::from_secs(config.store_timeout_secs));
    let state = AppState {
        movies,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
