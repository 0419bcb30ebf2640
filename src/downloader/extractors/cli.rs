// CLI extractor - drives the native `yt-dlp` binary
//
// Two paths:
// - extract: metadata probe, format selection, single-item download
// - extract_images: thumbnail capture for image-only posts, with one alternate invocation
//
// yt-dlp picks the final extension itself (after merging, thumbnail conversion),
// so results are located by the random prefix given in the output template.

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use super::diagnostics::{classify, diagnose_error, first_error_line};
use super::traits::MediaExtractor;
use crate::downloader::config::{AcquisitionConfig, BROWSER_USER_AGENT};
use crate::downloader::errors::DownloadError;
use crate::downloader::format_selector::{FormatSelector, FormatSpec};
use crate::downloader::models::{CapabilitySnapshot, MediaDescriptor, Multiplicity, StagedArtifact};
use crate::downloader::tools::ToolPaths;
use crate::downloader::utils::{
    find_by_prefix, get_proxy_args, get_timeout_args, random_token, remove_best_effort,
    run_output_with_timeout, CommandError,
};

/// Container requested when ffmpeg merges split streams
const MERGE_CONTAINER: &str = "mp4";

/// Raster format for the alternate thumbnail invocation
const THUMBNAIL_FORMAT: &str = "jpg";

/// Invocation shape for the image path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAttempt {
    /// Skip the video, write the thumbnail, generic best format
    Primary,
    /// Explicit no-download flag with thumbnail conversion
    Alternate,
}

/// yt-dlp backed extractor
pub struct YtDlpExtractor {
    paths: ToolPaths,
    config: Arc<AcquisitionConfig>,
}

impl YtDlpExtractor {
    pub fn new(paths: ToolPaths, config: Arc<AcquisitionConfig>) -> Self {
        Self { paths, config }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-warnings".to_string(),
            "--user-agent".to_string(),
            BROWSER_USER_AGENT.to_string(),
        ];
        args.extend(get_timeout_args(&self.config));
        args.extend(get_proxy_args(&self.config));
        args
    }

    /// Finish an argument list with the URL behind `--` so it is never read as an option
    fn push_url(mut args: Vec<String>, url: &str) -> Vec<String> {
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Build metadata probe arguments
    pub fn build_probe_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string(), "--skip-download".to_string()];
        args.extend(self.common_args());
        Self::push_url(args, url)
    }

    /// Build download arguments
    pub fn build_download_args(
        &self,
        url: &str,
        format: &FormatSpec,
        capabilities: &CapabilitySnapshot,
        template: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-f".to_string(), format.to_arg()];

        if capabilities.merger_present {
            args.push("--merge-output-format".to_string());
            args.push(MERGE_CONTAINER.to_string());
            args.push("--ffmpeg-location".to_string());
            args.push(self.paths.ffmpeg.to_string_lossy().to_string());
        }

        args.push("--no-playlist".to_string());
        args.push("-o".to_string());
        args.push(template.to_string_lossy().to_string());
        args.extend(self.common_args());
        Self::push_url(args, url)
    }

    /// Build image capture arguments
    pub fn build_image_args(&self, url: &str, template: &Path, attempt: ImageAttempt) -> Vec<String> {
        let mut args = match attempt {
            ImageAttempt::Primary => vec![
                "--skip-download".to_string(),
                "--write-thumbnail".to_string(),
                "-f".to_string(),
                "best".to_string(),
            ],
            ImageAttempt::Alternate => vec![
                "--no-download".to_string(),
                "--write-thumbnail".to_string(),
                "--convert-thumbnails".to_string(),
                THUMBNAIL_FORMAT.to_string(),
            ],
        };
        args.push("-o".to_string());
        args.push(template.to_string_lossy().to_string());
        args.extend(self.common_args());
        Self::push_url(args, url)
    }

    /// Parse `--dump-json` output: one JSON object per line, one line per item
    pub fn parse_descriptors(stdout: &[u8], url: &str) -> Result<Vec<MediaDescriptor>, DownloadError> {
        let text = String::from_utf8_lossy(stdout);
        let objects: Vec<serde_json::Value> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match serde_json::from_str::<serde_json::Value>(l) {
                Ok(v) if v.is_object() => Some(v),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping non-JSON probe line");
                    None
                }
            })
            .collect();

        if objects.is_empty() {
            return Err(DownloadError::Extraction(
                "yt-dlp returned no metadata".to_string(),
            ));
        }

        let multiplicity = Multiplicity::from_count(objects.len());
        Ok(objects
            .iter()
            .map(|json| MediaDescriptor {
                source_url: json["webpage_url"]
                    .as_str()
                    .or_else(|| json["url"].as_str())
                    .unwrap_or(url)
                    .to_string(),
                ext: json["ext"].as_str().unwrap_or("").to_string(),
                title: json["title"].as_str().unwrap_or("Untitled").to_string(),
                thumbnail: json["thumbnail"].as_str().map(|s| s.to_string()),
                duration: json["duration"].as_f64(),
                filesize: json["filesize"].as_u64().or_else(|| json["filesize_approx"].as_u64()),
                format_id: json["format_id"].as_str().map(|s| s.to_string()),
                width: json["width"].as_u64().map(|w| w as u32),
                height: json["height"].as_u64().map(|h| h as u32),
                multiplicity,
            })
            .collect())
    }

    /// Run yt-dlp and classify any failure from its diagnostic output
    async fn run_tool(&self, args: &[String], limit: Duration, output_limit: usize) -> Result<Output, DownloadError> {
        tracing::debug!(program = %self.paths.ytdlp.display(), args = ?args, "running yt-dlp");

        match run_output_with_timeout(&self.paths.ytdlp, args, limit, output_limit).await {
            Ok(out) if out.status.success() => Ok(out),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                tracing::debug!(status = ?out.status.code(), stderr = %stderr, "yt-dlp failed");
                Err(classify(&stderr))
            }
            Err(e @ CommandError::Spawn { .. }) => Err(DownloadError::Extraction(e.to_string())),
            Err(e) => Err(classify(&e.diagnostic_text())),
        }
    }

    /// Metadata probe (lighter invocation, short timeout)
    pub async fn probe(&self, url: &str) -> Result<Vec<MediaDescriptor>, DownloadError> {
        let args = self.build_probe_args(url);
        let out = self
            .run_tool(&args, self.config.probe_timeout, self.config.probe_output_limit)
            .await?;
        Self::parse_descriptors(&out.stdout, url)
    }

    async fn discard_prefix(scratch: &Path, prefix: &str) {
        if let Ok(files) = find_by_prefix(scratch, prefix).await {
            for f in files {
                remove_best_effort(&f).await;
            }
        }
    }

    async fn run_image_attempt(
        &self,
        url: &str,
        template: &Path,
        attempt: ImageAttempt,
    ) -> Result<(), DownloadError> {
        let args = self.build_image_args(url, template, attempt);
        self.run_tool(&args, self.config.image_timeout, self.config.probe_output_limit)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn extract(
        &self,
        url: &str,
        capabilities: &CapabilitySnapshot,
        scratch: &Path,
    ) -> Result<StagedArtifact, DownloadError> {
        let descriptors = self.probe(url).await?;
        // Multi-item posts: the first descriptor stands for the post
        let descriptor = descriptors
            .into_iter()
            .next()
            .ok_or_else(|| DownloadError::Extraction("yt-dlp returned no metadata".to_string()))?;

        let prefix = random_token();
        let template = scratch.join(format!("{}.%(ext)s", prefix));
        let format = FormatSelector::select(Some(&descriptor), capabilities);
        tracing::info!(
            title = %descriptor.title,
            ext = %descriptor.ext,
            format = %format,
            merge = capabilities.merger_present,
            "downloading with yt-dlp"
        );

        let args = self.build_download_args(url, &format, capabilities, &template);
        if let Err(e) = self
            .run_tool(&args, self.config.download_timeout, self.config.download_output_limit)
            .await
        {
            Self::discard_prefix(scratch, &prefix).await;
            return Err(e);
        }

        let mut found = find_by_prefix(scratch, &prefix).await?.into_iter();
        let path = found.next().ok_or(DownloadError::ArtifactNotFound)?;
        for extra in found {
            remove_best_effort(&extra).await;
        }

        let size = tokio::fs::metadata(&path).await?.len();
        if size == 0 {
            remove_best_effort(&path).await;
            return Err(DownloadError::EmptyArtifact);
        }

        Ok(StagedArtifact {
            path,
            descriptor: Some(descriptor),
        })
    }

    async fn extract_images(&self, url: &str, scratch: &Path) -> Result<Vec<StagedArtifact>, DownloadError> {
        let prefix = random_token();
        let template = scratch.join(format!("{}_%(autonumber)s.%(ext)s", prefix));

        // The alternate invocation only runs when the primary one fails
        let mut found = Vec::new();
        for attempt in [ImageAttempt::Primary, ImageAttempt::Alternate] {
            let outcome = self.run_image_attempt(url, &template, attempt).await;
            found = find_by_prefix(scratch, &prefix).await?;
            match outcome {
                Ok(()) => {
                    if found.is_empty() {
                        tracing::warn!(attempt = ?attempt, "image capture produced no files");
                    }
                    break;
                }
                Err(e) => {
                    let cause = diagnose_error(&e.to_string());
                    tracing::warn!(
                        attempt = ?attempt,
                        cause = cause.description(),
                        error = %first_error_line(&e.to_string()),
                        "image capture failed"
                    );
                    if !found.is_empty() {
                        break;
                    }
                }
            }
        }

        let mut staged = Vec::with_capacity(found.len());
        for path in found {
            if tokio::fs::metadata(&path).await?.len() == 0 {
                remove_best_effort(&path).await;
                continue;
            }
            staged.push(StagedArtifact { path, descriptor: None });
        }

        if staged.is_empty() {
            return Err(DownloadError::ImageExtraction("no images found".to_string()));
        }
        Ok(staged)
    }
}
