// External tool resolution and per-request capability probing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::downloader::config::AcquisitionConfig;
use crate::downloader::models::CapabilitySnapshot;
use crate::downloader::utils::run_output_with_timeout;

/// Version output is tiny; anything past this is noise
const VERSION_OUTPUT_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
        }
    }
}

/// Locate a tool binary: explicit override, common install paths, then PATH.
///
/// Falls back to the bare name so a later probe reports the tool absent.
pub fn resolve_tool(tool: ToolType, override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }

    let binary_name = tool.as_str();
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if Path::new(&path).exists() {
            return PathBuf::from(path);
        }
    }

    which::which(binary_name).unwrap_or_else(|_| PathBuf::from(binary_name))
}

/// Resolved locations of both external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
}

impl ToolPaths {
    pub fn resolve(config: &AcquisitionConfig) -> Self {
        let paths = Self {
            ytdlp: resolve_tool(ToolType::YtDlp, config.ytdlp_path.as_deref()),
            ffmpeg: resolve_tool(ToolType::Ffmpeg, config.ffmpeg_path.as_deref()),
        };
        tracing::info!(
            ytdlp = %paths.ytdlp.display(),
            ffmpeg = %paths.ffmpeg.display(),
            "resolved external tools"
        );
        paths
    }

    pub fn get(&self, tool: ToolType) -> &Path {
        match tool {
            ToolType::YtDlp => &self.ytdlp,
            ToolType::Ffmpeg => &self.ffmpeg,
        }
    }
}

/// Reports which external tools are usable right now
#[async_trait]
pub trait CapabilityProber: Send + Sync {
    async fn probe(&self) -> CapabilitySnapshot;
}

/// Probes the host by running each tool's version command
pub struct SystemProber {
    paths: ToolPaths,
    timeout: Duration,
}

impl SystemProber {
    pub fn new(paths: ToolPaths, timeout: Duration) -> Self {
        Self { paths, timeout }
    }

    /// Version string of a tool, `None` when missing, failing or timed out
    pub async fn get_version(&self, tool: ToolType) -> Option<String> {
        let args = vec![tool.version_arg().to_string()];
        match run_output_with_timeout(self.paths.get(tool), &args, self.timeout, VERSION_OUTPUT_LIMIT).await {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                // ffmpeg prints a banner; the first line carries the version
                Some(out.lines().next().unwrap_or_default().trim().to_string())
            }
            Ok(output) => {
                tracing::debug!(tool = tool.as_str(), status = ?output.status.code(), "version check failed");
                None
            }
            Err(e) => {
                tracing::debug!(tool = tool.as_str(), error = %e, "version check failed");
                None
            }
        }
    }
}

#[async_trait]
impl CapabilityProber for SystemProber {
    async fn probe(&self) -> CapabilitySnapshot {
        let (ytdlp, ffmpeg) = tokio::join!(
            self.get_version(ToolType::YtDlp),
            self.get_version(ToolType::Ffmpeg)
        );

        if ytdlp.is_none() {
            tracing::warn!("yt-dlp is not available, only direct fetch can be used");
        }
        if ffmpeg.is_none() {
            tracing::info!("ffmpeg is not available, skipping stream merging");
        }

        CapabilitySnapshot::new(ytdlp.is_some(), ffmpeg.is_some())
    }
}
