//! Mock platform serving fixed validation and disbursement answers for local runs.

use reward_api::{config, mock_platform};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config::mock_platform_listen()?;
    tracing::info!("mock platform listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        mock_platform::router().into_make_service(),
    )
    .await?;
    Ok(())
}
