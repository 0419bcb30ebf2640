// Downloader module - layered media acquisition
//
// tools -> capability probe, format_selector -> yt-dlp format string,
// extractors -> yt-dlp video/image paths, direct -> HTTP fallback,
// orchestrator -> strategy table tying them together

pub mod config;
pub mod direct;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AcquisitionConfig;
pub use direct::{DirectFetcher, FetchedMedia, HttpFetcher};
pub use errors::DownloadError;
pub use extractors::{MediaExtractor, YtDlpExtractor};
pub use models::{AcquisitionMethod, AcquisitionRequest, CapabilitySnapshot, FinalArtifact, MediaKind};
pub use orchestrator::Acquirer;
pub use tools::{CapabilityProber, SystemProber, ToolPaths};
