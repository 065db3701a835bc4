use anyhow::Result;
use persistence::client::HttpRecordClient;
use std::sync::Arc;
use tracing::{info, warn};

use supporthub_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting SupportHub API v{}", env!("CARGO_PKG_VERSION"));

    let client_config = config.record_api.client_config();
    if !client_config.has_credentials() {
        warn!("Record API credentials are not configured; every record call will fail");
    }
    let records = Arc::new(HttpRecordClient::new(client_config)?);

    let addr = config.socket_addr()?;
    let app = app::create_app(config, records);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
