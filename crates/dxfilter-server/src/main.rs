//! DXFilter - DXF 图层过滤服务

use anyhow::{Context, Result};
use clap::Parser;
use dxfilter_server::cli::Cli;
use dxfilter_server::logging::init_logging;
use dxfilter_server::{router, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Cli::parse().into_config()?;
    info!(
        max_upload_bytes = config.max_upload_bytes,
        max_stored_files = config.max_stored_files,
        file_ttl_secs = config.file_ttl_secs,
        "starting DXFilter"
    );

    let addr = config.bind_addr();
    let state = AppState::from_config(config)?.shared();
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("DXFilter stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            tracing::warn!(error = %err, "could not listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
