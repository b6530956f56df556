use anyhow::Context;

use retailx_api::config::ConfigLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing or weak signing secret stops the process here.
    let config = ConfigLoader::from_env()
        .load()
        .context("invalid configuration")?;

    retailx_observability::init(config.log_format);

    let addr = config.bind_addr()?;
    let app = retailx_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
