// FormatSelector - yt-dlp format selection for one request
//
// The result is a priority chain handed to yt-dlp's `-f` syntax, joined with `/`.
// - Still images: the generic "best" selector
// - Video with ffmpeg: split streams capped at 1080p, compatible containers first
// - Video without ffmpeg: pre-muxed streams only (unmerged video would lack audio)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{CapabilitySnapshot, MediaDescriptor};

/// Height ceiling for every video alternative
pub const MAX_HEIGHT: u32 = 1080;

/// Ordered list of yt-dlp format alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    alternatives: Vec<String>,
}

impl FormatSpec {
    fn from_parts(parts: &[String]) -> Self {
        Self {
            alternatives: parts.to_vec(),
        }
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Whether any alternative combines separate video and audio streams
    pub fn requires_merge(&self) -> bool {
        self.alternatives.iter().any(|a| a.contains('+'))
    }

    /// Value for yt-dlp's `-f` argument
    pub fn to_arg(&self) -> String {
        self.alternatives.join("/")
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_arg())
    }
}

/// Format selector with fixed tie-break rules
pub struct FormatSelector;

impl FormatSelector {
    /// Pick the format chain for a descriptor (or unknown media) and the probed tools
    pub fn select(descriptor: Option<&MediaDescriptor>, capabilities: &CapabilitySnapshot) -> FormatSpec {
        if descriptor.is_some_and(MediaDescriptor::is_image) {
            return FormatSpec::from_parts(&["best".to_string()]);
        }

        let h = MAX_HEIGHT;
        if capabilities.merger_present {
            FormatSpec::from_parts(&[
                format!("bv*[height<={h}][ext=mp4]+ba[ext=m4a]"),
                format!("bv*[height<={h}]+ba"),
                format!("b[height<={h}]"),
                "b".to_string(),
            ])
        } else {
            FormatSpec::from_parts(&[format!("b[height<={h}]"), "b".to_string()])
        }
    }
}
