use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finesi::{app, AppState, Config, LandingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let landing = LandingConfig::load(config.landing_config.as_deref())?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Storing uploads in {}", config.upload_dir.display());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server is running on http://{}", config.bind_addr);
    info!("API docs at http://{}/docs", config.bind_addr);

    axum::serve(listener, app(AppState::new(pool, config, landing))).await?;

    Ok(())
}
