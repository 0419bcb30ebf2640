pub mod downloader;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use downloader::{Acquirer, AcquisitionConfig, DownloadError};

/// Build the acquirer from `config` and serve the HTTP API on `bind` until shutdown
pub async fn run(config: AcquisitionConfig, bind: SocketAddr) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(&config.public_dir).await?;
    tokio::fs::create_dir_all(&config.scratch_dir).await?;

    let acquirer = Arc::new(Acquirer::from_config(config)?);
    let capabilities = acquirer.capabilities().await;
    if !capabilities.extractor_present {
        tracing::warn!("yt-dlp not found, only direct fetch is available");
    }
    if !capabilities.merger_present {
        tracing::warn!("ffmpeg not found, video downloads limited to single-file formats");
    }

    server::serve(bind, acquirer).await?;
    Ok(())
}
