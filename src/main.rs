use tracing::info;
use tracing_subscriber::EnvFilter;

use research_hub::config::AppConfig;
use research_hub::database::init_db;
use research_hub::state::AppState;
use research_hub::{build_router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::seed_defaults(&db).await?;
    seed::ensure_indexes(&db).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { db, config };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
