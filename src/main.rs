use std::sync::Arc;

use bookrec_api::{
    api::{create_router, AppContext},
    config::Config,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Load the catalog, identity index and model once; requests only read them
    let ctx = Arc::new(AppContext::load(&config)?);
    let app = create_router(ctx);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
