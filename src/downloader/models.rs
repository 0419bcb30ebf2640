// Common data models for the acquisition pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Extensions the extraction tool reports for still images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "webp"];

/// Final extensions classified as video when promoting an artifact
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv"];

/// One acquisition request, immutable for the lifetime of the request.
///
/// Deserialized straight from the HTTP body; a missing url becomes empty and
/// is rejected by URL validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_true")]
    pub prefer_video: bool,
    #[serde(default, rename = "downloadImages")]
    pub download_images_only: bool,
    #[serde(default = "default_true", rename = "useYtDlp")]
    pub use_extraction_tool: bool,
}

fn default_true() -> bool {
    true
}

impl AcquisitionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prefer_video: true,
            download_images_only: false,
            use_extraction_tool: true,
        }
    }

    pub fn with_prefer_video(mut self, prefer: bool) -> Self {
        self.prefer_video = prefer;
        self
    }

    pub fn with_images_only(mut self, images_only: bool) -> Self {
        self.download_images_only = images_only;
        self
    }

    pub fn with_extraction_tool(mut self, enabled: bool) -> Self {
        self.use_extraction_tool = enabled;
        self
    }
}

/// Whether the probe returned one item or one descriptor per sub-item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    Single,
    Sequence(usize),
}

impl Multiplicity {
    pub fn from_count(count: usize) -> Self {
        if count > 1 {
            Self::Sequence(count)
        } else {
            Self::Single
        }
    }
}

/// Metadata reported by the extraction tool before download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub source_url: String,
    pub ext: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub filesize: Option<u64>,
    pub format_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub multiplicity: Multiplicity,
}

impl MediaDescriptor {
    /// Check if the declared container is a still image
    pub fn is_image(&self) -> bool {
        let ext = self.ext.to_ascii_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    }
}

/// A downloaded file in the per-request scratch area
#[derive(Debug, Clone, PartialEq)]
pub struct StagedArtifact {
    pub path: PathBuf,
    pub descriptor: Option<MediaDescriptor>,
}

impl StagedArtifact {
    /// Lowercased extension of the staged file, `bin` when it has none
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Classify a final extension against the fixed video set
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Which strategy produced the final artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMethod {
    #[serde(rename = "yt-dlp")]
    ToolVideo,
    #[serde(rename = "yt-dlp-image")]
    ToolImage,
    #[serde(rename = "direct")]
    Direct,
}

impl AcquisitionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolVideo => "yt-dlp",
            Self::ToolImage => "yt-dlp-image",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata subset handed back to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
}

impl From<&MediaDescriptor> for ArtifactInfo {
    fn from(d: &MediaDescriptor) -> Self {
        Self {
            title: Some(d.title.clone()),
            duration: d.duration,
            thumbnail: d.thumbnail.clone(),
            width: d.width,
            height: d.height,
            content_type: None,
            item_count: match d.multiplicity {
                Multiplicity::Single => None,
                Multiplicity::Sequence(n) => Some(n),
            },
        }
    }
}

/// The committed, publicly addressable result of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub kind: MediaKind,
    pub size: u64,
    pub method: AcquisitionMethod,
    pub info: ArtifactInfo,
}

/// Which external tools are usable for this request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySnapshot {
    pub extractor_present: bool,
    pub merger_present: bool,
}

impl CapabilitySnapshot {
    pub fn new(extractor_present: bool, merger_present: bool) -> Self {
        Self {
            extractor_present,
            merger_present,
        }
    }
}
