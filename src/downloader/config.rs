// Acquisition configuration: directories, timeouts and output ceilings

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CAPABILITY_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Ceiling for captured metadata output (20 MiB)
pub const DEFAULT_PROBE_OUTPUT_LIMIT: usize = 20 * 1024 * 1024;

/// Ceiling for captured download stdout/stderr (100 MiB)
pub const DEFAULT_DOWNLOAD_OUTPUT_LIMIT: usize = 100 * 1024 * 1024;

/// Maximum body accepted by the direct fetch (200 MiB)
pub const DEFAULT_MAX_FETCH_BYTES: u64 = 200 * 1024 * 1024;

/// Desktop browser UA sent by yt-dlp and the direct fetch
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Configuration shared by every request
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Directory served publicly as `/media/<filename>`
    pub public_dir: PathBuf,
    /// Internal scratch root; each request gets its own subdirectory
    pub scratch_dir: PathBuf,
    /// Explicit yt-dlp path (skips lookup)
    pub ytdlp_path: Option<PathBuf>,
    /// Explicit ffmpeg path (skips lookup)
    pub ffmpeg_path: Option<PathBuf>,
    /// SOCKS5/HTTP proxy URL applied to yt-dlp and the HTTP client
    pub proxy: Option<String>,
    pub capability_timeout: Duration,
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
    pub image_timeout: Duration,
    pub fetch_timeout: Duration,
    pub probe_output_limit: usize,
    pub download_output_limit: usize,
    pub max_fetch_bytes: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public").join("media"),
            scratch_dir: default_scratch_dir(),
            ytdlp_path: None,
            ffmpeg_path: None,
            proxy: None,
            capability_timeout: Duration::from_secs(DEFAULT_CAPABILITY_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            image_timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            probe_output_limit: DEFAULT_PROBE_OUTPUT_LIMIT,
            download_output_limit: DEFAULT_DOWNLOAD_OUTPUT_LIMIT,
            max_fetch_bytes: DEFAULT_MAX_FETCH_BYTES,
        }
    }
}

/// `<cache dir>/media-downloader/scratch`, or the system temp dir when no cache dir exists
pub fn default_scratch_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("media-downloader")
        .join("scratch")
}

impl AcquisitionConfig {
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_ffmpeg_path(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_max_fetch_bytes(mut self, max: u64) -> Self {
        self.max_fetch_bytes = max;
        self
    }

    /// Anchor relative public and scratch directories at the working directory
    pub fn with_absolute_dirs(mut self) -> std::io::Result<Self> {
        if self.public_dir.is_relative() || self.scratch_dir.is_relative() {
            let cwd = std::env::current_dir()?;
            self.public_dir = cwd.join(&self.public_dir);
            self.scratch_dir = cwd.join(&self.scratch_dir);
        }
        Ok(self)
    }

    /// Directories whose absolute paths must never appear in user-facing messages
    pub fn private_dirs(&self) -> Vec<PathBuf> {
        vec![self.scratch_dir.clone(), self.public_dir.clone()]
    }
}
