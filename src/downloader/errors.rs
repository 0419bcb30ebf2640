// Error taxonomy for the acquisition pipeline

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    /// Missing, empty or unusable URL
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The source requires sign-in
    #[error("Source requires authentication: {0}")]
    UpstreamAuth(String),

    /// The source is throttling requests
    #[error("Rate limited by source: {0}")]
    RateLimited(String),

    /// The post holds no video; triggers the image path
    #[error("No video in this post: {0}")]
    NoVideoInPost(String),

    /// Any other extraction tool failure
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Image extraction failed: {0}")]
    ImageExtraction(String),

    #[error("Downloaded file not found")]
    ArtifactNotFound,

    #[error("Downloaded file is empty")]
    EmptyArtifact,

    /// Non-2xx response or transport error on the direct fetch
    #[error("Direct fetch failed: {message}")]
    DirectFetch { status: Option<u16>, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    /// Every planned strategy failed
    #[error("All download strategies failed: {trail}")]
    Exhausted {
        decisive: Box<DownloadError>,
        trail: String,
    },
}

impl DownloadError {
    /// HTTP status carried by the classification
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::UpstreamAuth(_)
            | Self::NoVideoInPost(_)
            | Self::Extraction(_)
            | Self::ImageExtraction(_) => 400,
            Self::RateLimited(_) => 429,
            Self::ArtifactNotFound | Self::EmptyArtifact | Self::DirectFetch { .. } => 502,
            Self::Internal(_) => 500,
            Self::Exhausted { decisive, .. } => decisive.status_code(),
        }
    }

    /// Stable kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::UpstreamAuth(_) => "UpstreamAuthError",
            Self::RateLimited(_) => "RateLimited",
            Self::NoVideoInPost(_) => "NoVideoInPost",
            Self::Extraction(_) => "ExtractionFailure",
            Self::ImageExtraction(_) => "ImageExtractionFailure",
            Self::ArtifactNotFound => "ArtifactNotFound",
            Self::EmptyArtifact => "EmptyArtifact",
            Self::DirectFetch { .. } => "DirectFetchFailure",
            Self::Internal(_) => "InternalError",
            Self::Exhausted { decisive, .. } => decisive.kind(),
        }
    }

    /// Failures that outrank later ones when composing the final error
    pub fn is_decisive(&self) -> bool {
        matches!(self, Self::UpstreamAuth(_) | Self::RateLimited(_))
    }

    pub fn is_no_video(&self) -> bool {
        matches!(self, Self::NoVideoInPost(_))
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

lazy_static! {
    /// Path-like tokens: runs between whitespace, quotes and brackets
    static ref PATH_TOKEN: Regex = Regex::new(r#"[^\s"'()\[\]]+"#).unwrap_or_else(|e| panic!("invalid token pattern: {e}"));
}

/// Replace internal directory paths in a message with a placeholder.
///
/// Only absolute directories are considered, and only tokens that are the
/// directory itself or a path below it are rewritten.
pub fn redact_paths<P: AsRef<Path>>(message: &str, dirs: &[P]) -> String {
    let dirs: Vec<String> = dirs
        .iter()
        .map(|d| d.as_ref())
        .filter(|d| d.is_absolute())
        .map(|d| d.to_string_lossy().trim_end_matches(['/', '\\']).to_string())
        .filter(|d| !d.is_empty())
        .collect();

    PATH_TOKEN
        .replace_all(message, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            for dir in &dirs {
                if let Some(rest) = token.strip_prefix(dir.as_str()) {
                    if rest.is_empty() || rest.starts_with(['/', '\\']) {
                        return format!("<internal>{}", rest);
                    }
                }
            }
            token.to_string()
        })
        .into_owned()
}
