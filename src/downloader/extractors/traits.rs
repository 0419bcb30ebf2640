// MediaExtractor trait - the extraction tool seam

use async_trait::async_trait;
use std::path::Path;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{CapabilitySnapshot, StagedArtifact};

/// Trait for tool-backed extractors
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Download the single representative item of `url` into `scratch`.
    ///
    /// Fails with `NoVideoInPost` when the source holds only images.
    async fn extract(
        &self,
        url: &str,
        capabilities: &CapabilitySnapshot,
        scratch: &Path,
    ) -> Result<StagedArtifact, DownloadError>;

    /// Capture every image of an image-only post into `scratch`
    async fn extract_images(&self, url: &str, scratch: &Path) -> Result<Vec<StagedArtifact>, DownloadError>;
}
