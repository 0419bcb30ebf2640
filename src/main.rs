use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use media_downloader_lib::downloader::config::{default_scratch_dir, DEFAULT_DOWNLOAD_TIMEOUT_SECS};
use media_downloader_lib::downloader::AcquisitionConfig;

#[derive(Parser)]
#[command(name = "media-downloader", version, about = "Media acquisition service")]
struct Cli {
    /// Address to bind the HTTP API to.
    #[arg(long, env = "MEDIA_DOWNLOADER_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Directory for finished artifacts (served elsewhere as /media/<filename>).
    #[arg(long, env = "MEDIA_DOWNLOADER_PUBLIC_DIR", default_value = "public/media")]
    public_dir: PathBuf,

    /// Internal scratch directory (defaults to the user cache dir).
    #[arg(long, env = "MEDIA_DOWNLOADER_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Explicit yt-dlp binary.
    #[arg(long, env = "MEDIA_DOWNLOADER_YTDLP_PATH")]
    ytdlp_path: Option<PathBuf>,

    /// Explicit ffmpeg binary.
    #[arg(long, env = "MEDIA_DOWNLOADER_FFMPEG_PATH")]
    ffmpeg_path: Option<PathBuf>,

    /// Proxy URL (socks5:// or http://) for yt-dlp and direct fetches.
    #[arg(long, env = "MEDIA_DOWNLOADER_PROXY")]
    proxy: Option<String>,

    /// Ceiling for a full yt-dlp download, in seconds.
    #[arg(long, env = "MEDIA_DOWNLOADER_DOWNLOAD_TIMEOUT", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    download_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "MEDIA_DOWNLOADER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

impl Cli {
    fn acquisition_config(&self) -> AcquisitionConfig {
        AcquisitionConfig::default()
            .with_public_dir(&self.public_dir)
            .with_scratch_dir(self.scratch_dir.clone().unwrap_or_else(default_scratch_dir))
            .with_ytdlp_path(self.ytdlp_path.clone())
            .with_ffmpeg_path(self.ffmpeg_path.clone())
            .with_proxy(self.proxy.clone())
            .with_download_timeout(Duration::from_secs(self.download_timeout_secs))
    }
}

fn init_telemetry(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false).with_ansi(true))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = cli.acquisition_config();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        public_dir = %config.public_dir.display(),
        scratch_dir = %config.scratch_dir.display(),
        "starting media downloader"
    );

    media_downloader_lib::run(config, cli.bind).await?;
    Ok(())
}
