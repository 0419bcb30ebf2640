// Acquisition orchestrator - strategy table with fallback
//
// Per request: validate -> probe capabilities -> walk the plan
//   [Video, Images, Direct] by default
// Each stage returns a StageOutcome; Retryable moves on to the next stage,
// Fatal and Done end the walk. Images right after a failed Video stage only
// runs when the failure was NoVideoInPost.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::config::AcquisitionConfig;
use super::direct::{infer_extension, DirectFetcher, HttpFetcher};
use super::errors::{redact_paths, DownloadError};
use super::extractors::{MediaExtractor, YtDlpExtractor};
use super::models::{
    AcquisitionMethod, AcquisitionRequest, ArtifactInfo, CapabilitySnapshot, FinalArtifact, MediaKind,
    StagedArtifact,
};
use super::tools::{CapabilityProber, SystemProber, ToolPaths};
use super::utils::{create_request_scratch, promote, public_filename, remove_best_effort};

/// One acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Video,
    Images,
    Direct,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "yt-dlp",
            Self::Images => "yt-dlp-image",
            Self::Direct => "direct",
        }
    }

    fn needs_scratch(&self) -> bool {
        !matches!(self, Self::Direct)
    }
}

/// Result of running one stage
#[derive(Debug)]
pub enum StageOutcome {
    Done(FinalArtifact),
    /// Move on to the next stage
    Retryable(DownloadError),
    /// Stop; nothing left to fall back to
    Fatal(DownloadError),
}

const DIRECT_ONLY: &[Stage] = &[Stage::Direct];
const IMAGES_ONLY: &[Stage] = &[Stage::Images, Stage::Direct];
const IMAGES_FIRST: &[Stage] = &[Stage::Images, Stage::Video, Stage::Direct];
const VIDEO_FIRST: &[Stage] = &[Stage::Video, Stage::Images, Stage::Direct];

/// Strategy order for a request and the probed tools
///
/// An images-only request never enters the video stage: it starts at Images
/// rather than leaving a video attempt through the images transition.
pub fn plan(request: &AcquisitionRequest, capabilities: &CapabilitySnapshot) -> &'static [Stage] {
    if !request.use_extraction_tool || !capabilities.extractor_present {
        DIRECT_ONLY
    } else if request.download_images_only {
        IMAGES_ONLY
    } else if !request.prefer_video {
        IMAGES_FIRST
    } else {
        VIDEO_FIRST
    }
}

/// Whether `stage` runs given the previous failure
pub fn should_enter(stage: Stage, previous: Option<(Stage, &DownloadError)>) -> bool {
    match (stage, previous) {
        (Stage::Images, Some((Stage::Video, err))) => err.is_no_video(),
        _ => true,
    }
}

/// Reject missing, empty or non-http(s) URLs before any tool or network call
pub fn validate_url(raw: &str) -> Result<String, DownloadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DownloadError::Validation("URL is required".to_string()));
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| DownloadError::Validation(format!("invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(DownloadError::Validation(format!("unsupported URL scheme: {}", other))),
    }
}

/// Sequences probing, extraction, image fallback and direct fetch
pub struct Acquirer {
    config: Arc<AcquisitionConfig>,
    prober: Box<dyn CapabilityProber>,
    extractor: Box<dyn MediaExtractor>,
    fetcher: Box<dyn DirectFetcher>,
}

impl Acquirer {
    pub fn new(
        config: Arc<AcquisitionConfig>,
        prober: Box<dyn CapabilityProber>,
        extractor: Box<dyn MediaExtractor>,
        fetcher: Box<dyn DirectFetcher>,
    ) -> Self {
        Self {
            config,
            prober,
            extractor,
            fetcher,
        }
    }

    /// Wire the production yt-dlp, ffmpeg and HTTP implementations
    pub fn from_config(config: AcquisitionConfig) -> Result<Self, DownloadError> {
        let config = Arc::new(config.with_absolute_dirs()?);
        let paths = ToolPaths::resolve(&config);
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(
            config.clone(),
            Box::new(SystemProber::new(paths.clone(), config.capability_timeout)),
            Box::new(YtDlpExtractor::new(paths, config.clone())),
            Box::new(fetcher),
        ))
    }

    pub async fn capabilities(&self) -> CapabilitySnapshot {
        self.prober.probe().await
    }

    /// Acquire the media behind `request.url` and publish it under a fresh name
    #[tracing::instrument(name = "acquire", skip_all, fields(url = %request.url))]
    pub async fn acquire(&self, request: &AcquisitionRequest) -> Result<FinalArtifact, DownloadError> {
        let url = validate_url(&request.url)?;
        let started = Instant::now();

        let capabilities = if request.use_extraction_tool {
            self.prober.probe().await
        } else {
            CapabilitySnapshot::default()
        };
        let stages = plan(request, &capabilities);
        tracing::info!(
            tool = self.extractor.name(),
            extractor = capabilities.extractor_present,
            merger = capabilities.merger_present,
            plan = ?stages,
            "starting acquisition"
        );

        let scratch = if stages.iter().any(Stage::needs_scratch) {
            match create_request_scratch(&self.config.scratch_dir).await {
                Ok(dir) => Some(dir),
                Err(e) => {
                    return Err(DownloadError::Internal(format!(
                        "failed to create scratch directory: {}",
                        e.kind()
                    )))
                }
            }
        } else {
            None
        };

        // Dropping the guard removes the directory, also when this future is cancelled
        let result = self
            .run_plan(&url, stages, &capabilities, scratch.as_ref().map(|dir| dir.path()))
            .await;

        if let Some(dir) = scratch {
            if let Err(e) = dir.close() {
                tracing::warn!(error = %e, "failed to remove scratch directory");
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(artifact) => tracing::info!(
                method = %artifact.method,
                filename = %artifact.filename,
                size = artifact.size,
                elapsed_ms,
                "acquisition succeeded"
            ),
            Err(e) => tracing::warn!(kind = e.kind(), error = %e, elapsed_ms, "acquisition failed"),
        }
        result
    }

    async fn run_plan(
        &self,
        url: &str,
        stages: &[Stage],
        capabilities: &CapabilitySnapshot,
        scratch: Option<&Path>,
    ) -> Result<FinalArtifact, DownloadError> {
        let mut failures: Vec<(Stage, DownloadError)> = Vec::new();

        for &stage in stages {
            let previous = failures.last().map(|(s, e)| (*s, e));
            if !should_enter(stage, previous) {
                tracing::debug!(stage = stage.name(), "skipping stage");
                continue;
            }

            tracing::info!(stage = stage.name(), "trying strategy");
            match self.run_stage(stage, url, capabilities, scratch).await {
                StageOutcome::Done(artifact) => return Ok(artifact),
                StageOutcome::Retryable(e) => {
                    tracing::warn!(stage = stage.name(), kind = e.kind(), error = %e, "strategy failed, falling back");
                    failures.push((stage, e));
                }
                StageOutcome::Fatal(e) => {
                    tracing::warn!(stage = stage.name(), kind = e.kind(), error = %e, "strategy failed");
                    failures.push((stage, e));
                    break;
                }
            }
        }

        Err(self.compose_failure(failures))
    }

    /// Single failure: returned as is. Several: the decisive one drives the classification.
    fn compose_failure(&self, mut failures: Vec<(Stage, DownloadError)>) -> DownloadError {
        if failures.len() <= 1 {
            return failures
                .pop()
                .map(|(_, e)| e)
                .unwrap_or_else(|| DownloadError::Internal("no download strategy available".to_string()));
        }

        let trail = failures
            .iter()
            .map(|(stage, e)| format!("{}: {}", stage.name(), e))
            .collect::<Vec<_>>()
            .join("; ");
        let trail = redact_paths(&trail, &self.config.private_dirs());

        let index = failures
            .iter()
            .position(|(_, e)| e.is_decisive())
            .unwrap_or(failures.len() - 1);
        let (_, decisive) = failures.swap_remove(index);

        DownloadError::Exhausted {
            decisive: Box::new(decisive),
            trail,
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        url: &str,
        capabilities: &CapabilitySnapshot,
        scratch: Option<&Path>,
    ) -> StageOutcome {
        if stage == Stage::Direct {
            return self.fetch_direct(url).await;
        }
        let Some(scratch) = scratch else {
            return StageOutcome::Fatal(DownloadError::Internal("scratch directory missing".to_string()));
        };

        match stage {
            Stage::Video => match self.extractor.extract(url, capabilities, scratch).await {
                Ok(staged) => self.finalize_video(staged).await,
                Err(e) => StageOutcome::Retryable(e),
            },
            Stage::Images => match self.extractor.extract_images(url, scratch).await {
                Ok(images) => self.finalize_images(images).await,
                Err(e) => StageOutcome::Retryable(e),
            },
            Stage::Direct => self.fetch_direct(url).await,
        }
    }

    async fn finalize_video(&self, staged: StagedArtifact) -> StageOutcome {
        let ext = staged.extension();
        let info = staged.descriptor.as_ref().map(ArtifactInfo::from).unwrap_or_default();

        match self.publish(&staged, &ext).await {
            Ok((filename, path, size)) => StageOutcome::Done(FinalArtifact {
                filename,
                path,
                kind: MediaKind::from_extension(&ext),
                size,
                method: AcquisitionMethod::ToolVideo,
                info,
            }),
            Err(e) => StageOutcome::Retryable(e),
        }
    }

    async fn finalize_images(&self, images: Vec<StagedArtifact>) -> StageOutcome {
        let count = images.len();
        let mut images = images.into_iter();
        let Some(first) = images.next() else {
            return StageOutcome::Retryable(DownloadError::ImageExtraction("no images found".to_string()));
        };

        for rest in images {
            remove_best_effort(&rest.path).await;
        }

        let ext = first.extension();
        match self.publish(&first, &ext).await {
            Ok((filename, path, size)) => StageOutcome::Done(FinalArtifact {
                filename,
                path,
                kind: MediaKind::Image,
                size,
                method: AcquisitionMethod::ToolImage,
                info: ArtifactInfo {
                    item_count: (count > 1).then_some(count),
                    ..Default::default()
                },
            }),
            Err(e) => StageOutcome::Retryable(e),
        }
    }

    async fn publish(
        &self,
        staged: &StagedArtifact,
        ext: &str,
    ) -> Result<(String, PathBuf, u64), DownloadError> {
        let (filename, path) = promote(&staged.path, &self.config.public_dir, ext).await?;
        let size = tokio::fs::metadata(&path).await?.len();
        Ok((filename, path, size))
    }

    async fn fetch_direct(&self, url: &str) -> StageOutcome {
        let media = match self.fetcher.fetch(url).await {
            Ok(media) => media,
            Err(e) => return StageOutcome::Fatal(e),
        };
        if media.bytes.is_empty() {
            return StageOutcome::Fatal(DownloadError::EmptyArtifact);
        }

        let ext = infer_extension(media.content_type.as_deref());
        match self.write_public(&media.bytes, ext).await {
            Ok((filename, path)) => StageOutcome::Done(FinalArtifact {
                filename,
                path,
                kind: MediaKind::from_extension(ext),
                size: media.bytes.len() as u64,
                method: AcquisitionMethod::Direct,
                info: ArtifactInfo {
                    content_type: media.content_type,
                    ..Default::default()
                },
            }),
            Err(e) => StageOutcome::Fatal(e),
        }
    }

    /// Write through a hidden part file so the public name only appears once complete
    async fn write_public(&self, bytes: &[u8], ext: &str) -> Result<(String, PathBuf), DownloadError> {
        let public_dir = &self.config.public_dir;
        tokio::fs::create_dir_all(public_dir).await?;

        let filename = public_filename(ext);
        let target = public_dir.join(&filename);
        let part = public_dir.join(format!(".{}.part", filename));

        if let Err(e) = tokio::fs::write(&part, bytes).await {
            remove_best_effort(&part).await;
            return Err(DownloadError::Internal(format!("failed to write media: {}", e.kind())));
        }
        if let Err(e) = tokio::fs::rename(&part, &target).await {
            remove_best_effort(&part).await;
            return Err(DownloadError::Internal(format!("failed to publish media: {}", e.kind())));
        }
        Ok((filename, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::testing::{fetched, Harness, ImageBehavior, VideoBehavior};
    use std::time::Duration;

    fn both_tools() -> CapabilitySnapshot {
        CapabilitySnapshot::new(true, true)
    }

    fn no_tools() -> CapabilitySnapshot {
        CapabilitySnapshot::new(false, false)
    }

    fn fetch_404() -> Result<crate::downloader::direct::FetchedMedia, DownloadError> {
        Err(DownloadError::DirectFetch {
            status: Some(404),
            message: "HTTP 404".to_string(),
        })
    }

    #[test]
    fn plan_follows_request_and_capabilities() {
        let req = AcquisitionRequest::new("https://example.com/p");
        assert_eq!(plan(&req, &both_tools()), VIDEO_FIRST);
        assert_eq!(plan(&req, &no_tools()), DIRECT_ONLY);
        assert_eq!(plan(&req.clone().with_extraction_tool(false), &both_tools()), DIRECT_ONLY);
        assert_eq!(plan(&req.clone().with_images_only(true), &both_tools()), IMAGES_ONLY);
        assert_eq!(plan(&req.with_prefer_video(false), &both_tools()), IMAGES_FIRST);
    }

    #[test]
    fn images_after_video_only_on_no_video() {
        let no_video = DownloadError::NoVideoInPost("x".into());
        let other = DownloadError::Extraction("x".into());
        assert!(should_enter(Stage::Images, Some((Stage::Video, &no_video))));
        assert!(!should_enter(Stage::Images, Some((Stage::Video, &other))));
        assert!(should_enter(Stage::Images, None));
        assert!(should_enter(Stage::Direct, Some((Stage::Video, &other))));
        assert!(should_enter(Stage::Video, Some((Stage::Images, &other))));
    }

    #[test]
    fn validation_rejects_bad_urls() {
        assert!(matches!(validate_url(""), Err(DownloadError::Validation(_))));
        assert!(matches!(validate_url("   "), Err(DownloadError::Validation(_))));
        assert!(matches!(validate_url("--exec rm"), Err(DownloadError::Validation(_))));
        assert!(matches!(validate_url("file:///etc/passwd"), Err(DownloadError::Validation(_))));
        assert_eq!(validate_url(" https://example.com/v ").unwrap(), "https://example.com/v");
    }

    #[tokio::test]
    async fn empty_url_never_touches_tools() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b"video"),
        );
        let err = h.acquirer.acquire(&AcquisitionRequest::new("")).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(err.status_code(), 400);
        assert!(h.calls().is_empty());
        assert_eq!(h.probes.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_video_post_with_both_tools() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b"video"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/v/1"))
            .await
            .unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::ToolVideo);
        assert_eq!(artifact.kind, MediaKind::Video);
        assert_eq!(artifact.size, 5);
        assert!(artifact.filename.ends_with(".mp4"));
        assert_eq!(artifact.info.title.as_deref(), Some("Example post"));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"video");
        assert_eq!(h.calls(), vec!["extract"]);
        assert_eq!(h.public_files(), 1);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn image_only_post_falls_back_to_images() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::NoVideoInPost("There is no video in this post".into())),
            ImageBehavior::Produce(3),
            fetched("image/jpeg", b"jpeg"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/p/1"))
            .await
            .unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::ToolImage);
        assert_eq!(artifact.kind, MediaKind::Image);
        assert_eq!(artifact.info.item_count, Some(3));
        assert_eq!(h.calls(), vec!["extract", "extract_images"]);
        // Only the promoted image survives, and scratch is gone
        assert_eq!(h.public_files(), 1);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn missing_extractor_goes_straight_to_direct() {
        let h = Harness::new(
            no_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetched("video/webm", b"webm-bytes"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://cdn.example.com/a"))
            .await
            .unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::Direct);
        assert_eq!(artifact.kind, MediaKind::Video);
        assert!(artifact.filename.ends_with(".webm"));
        assert_eq!(artifact.info.content_type.as_deref(), Some("video/webm"));
        assert_eq!(h.calls(), vec!["fetch"]);
        assert_eq!(h.public_files(), 1);
    }

    #[tokio::test]
    async fn disabled_tool_skips_probe() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetched("image/png", b"png"),
        );
        let request = AcquisitionRequest::new("https://cdn.example.com/a.png").with_extraction_tool(false);
        let artifact = h.acquirer.acquire(&request).await.unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::Direct);
        assert_eq!(artifact.kind, MediaKind::Image);
        assert_eq!(h.calls(), vec!["fetch"]);
        assert_eq!(h.probes.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn direct_non_success_is_502_without_artifact() {
        let h = Harness::new(
            no_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetch_404(),
        );
        let err = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://cdn.example.com/a"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 502);
        assert_eq!(err.kind(), "DirectFetchFailure");
        assert_eq!(h.public_files(), 0);
    }

    #[tokio::test]
    async fn empty_direct_body_is_terminal() {
        let h = Harness::new(
            no_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b""),
        );
        let err = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://cdn.example.com/a"))
            .await
            .unwrap_err();

        assert_eq!(err, DownloadError::EmptyArtifact);
        assert_eq!(err.status_code(), 502);
        assert_eq!(h.public_files(), 0);
    }

    #[tokio::test]
    async fn empty_tool_artifact_falls_back_then_fails() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::EmptyArtifact),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b""),
        );
        let err = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "EmptyArtifact");
        assert_eq!(err.status_code(), 502);
        assert_eq!(h.calls(), vec!["extract", "fetch"]);
        assert_eq!(h.public_files(), 0);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn failed_image_fallback_ends_at_direct() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::NoVideoInPost("There is no video in this post".into())),
            ImageBehavior::Fail(DownloadError::ImageExtraction("no images found".into())),
            fetched("image/jpeg", b"jpeg"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/p/2"))
            .await
            .unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::Direct);
        assert_eq!(h.calls(), vec!["extract", "extract_images", "fetch"]);
        assert_eq!(h.public_files(), 1);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn cancelled_request_removes_scratch() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Stall("mp4"),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b"video"),
        );
        let request = AcquisitionRequest::new("https://example.com/v/slow");

        let outcome = tokio::time::timeout(Duration::from_millis(200), h.acquirer.acquire(&request)).await;

        assert!(outcome.is_err());
        assert_eq!(h.calls(), vec!["extract"]);
        assert_eq!(h.scratch_entries(), 0);
        assert_eq!(h.public_files(), 0);
    }

    #[tokio::test]
    async fn generic_extraction_failure_skips_images() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::Extraction("ERROR: Unsupported URL".into())),
            ImageBehavior::Produce(1),
            fetched("image/gif", b"gif"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/a.gif"))
            .await
            .unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::Direct);
        assert!(artifact.filename.ends_with(".gif"));
        assert_eq!(h.calls(), vec!["extract", "fetch"]);
    }

    #[tokio::test]
    async fn auth_failure_decides_final_classification() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::UpstreamAuth("ERROR: login required".into())),
            ImageBehavior::Produce(1),
            fetch_404(),
        );
        let err = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/private"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "UpstreamAuthError");
        assert_eq!(err.status_code(), 400);
        let message = err.to_string();
        assert!(message.contains("yt-dlp: Source requires authentication"));
        assert!(message.contains("direct: Direct fetch failed: HTTP 404"));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_429() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Fail(DownloadError::RateLimited("HTTP Error 429".into())),
            ImageBehavior::Produce(1),
            fetch_404(),
        );
        let err = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 429);
    }

    #[tokio::test]
    async fn images_only_request_starts_with_images() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("mp4", b"video"),
            ImageBehavior::Produce(2),
            fetched("video/mp4", b"video"),
        );
        let request = AcquisitionRequest::new("https://example.com/p").with_images_only(true);
        let artifact = h.acquirer.acquire(&request).await.unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::ToolImage);
        assert_eq!(h.calls(), vec!["extract_images"]);
    }

    #[tokio::test]
    async fn image_preference_falls_back_to_video() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("mkv", b"matroska"),
            ImageBehavior::Fail(DownloadError::ImageExtraction("no images found".into())),
            fetched("video/mp4", b"video"),
        );
        let request = AcquisitionRequest::new("https://example.com/p").with_prefer_video(false);
        let artifact = h.acquirer.acquire(&request).await.unwrap();

        assert_eq!(artifact.method, AcquisitionMethod::ToolVideo);
        assert_eq!(artifact.kind, MediaKind::Video);
        assert_eq!(h.calls(), vec!["extract_images", "extract"]);
    }

    #[tokio::test]
    async fn unknown_tool_extension_is_image() {
        let h = Harness::new(
            both_tools(),
            VideoBehavior::Produce("jpg", b"jpeg"),
            ImageBehavior::Produce(1),
            fetched("video/mp4", b"video"),
        );
        let artifact = h
            .acquirer
            .acquire(&AcquisitionRequest::new("https://example.com/p"))
            .await
            .unwrap();
        assert_eq!(artifact.method, AcquisitionMethod::ToolVideo);
        assert_eq!(artifact.kind, MediaKind::Image);
    }
}
