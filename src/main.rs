use api_rest::{AppState, RestConfig, router};
use depot_files::FilesService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Depot application
///
/// Opens (creating if needed) the storage directory and serves the REST API on it. Upload,
/// catalog, deletion, retrieval and request-log endpoints share one storage service and one
/// in-memory request log for the lifetime of the process.
///
/// # Environment Variables
/// - `DEPOT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DEPOT_UPLOAD_DIR`: Storage directory (default: "uploads")
/// - `RUST_LOG`: Log filter, in addition to `depot=info` and `api_rest=info`
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, storage setup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("depot=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RestConfig::from_env_values(
        std::env::var("DEPOT_REST_ADDR").ok(),
        std::env::var("DEPOT_UPLOAD_DIR").ok(),
    )?;

    let files = FilesService::open_or_create(config.upload_dir())?;

    tracing::info!("++ Starting Depot REST on {}", config.rest_addr());
    tracing::info!("++ Storing files in {}", files.root_directory().display());

    let listener = tokio::net::TcpListener::bind(config.rest_addr()).await?;
    axum::serve(listener, router(AppState::new(files))).await?;

    Ok(())
}
