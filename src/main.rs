use rusty_library_records::{
    adapters,
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::{Config, StorageBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 設定に従ってストアを初期化する
///
/// PostgreSQLの場合はマイグレーションも適用する。
async fn build_service_deps(config: &Config) -> Result<ServiceDependencies, BoxError> {
    match config.storage {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to PostgreSQL");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(adapters::postgres::service_dependencies(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will be lost on shutdown");
            Ok(adapters::memory::service_dependencies())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rusty_library_records=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(storage = ?config.storage, "Configuration loaded");

    let service_deps = build_service_deps(&config).await?;

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;
    Ok(())
}
