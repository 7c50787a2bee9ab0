use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipbridge::cleanup::Sweeper;
use clipbridge::config::Config;
use clipbridge::database::Database;
use clipbridge::handlers::{self, AppState};
use clipbridge::services::ClipboardService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipbridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize database
    let db = Database::new(&config.database_url).await?;
    db.migrate().await?;

    // Upload directory (files themselves are written by the upload handler)
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let port = config.port;
    let service = ClipboardService::new(config.clone(), db);

    // Start background sweep task
    Sweeper::new(service.clone(), config.sweep_interval_secs).spawn();

    let app_state = Arc::new(AppState { config, service });
    let app = handlers::app(app_state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("clipbridge listening on {}", addr);
    tracing::info!("API docs available at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Connect info feeds the rate limiter's peer-IP key extractor
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
