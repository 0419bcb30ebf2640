// Failure diagnostics - classifies yt-dlp diagnostic output
//
// yt-dlp has no structured error codes, so classification matches message text
// against an ordered pattern table. The first matching row wins. Message changes
// between yt-dlp releases can silently break a row, so deployments should pin
// the yt-dlp version these patterns were checked against.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::downloader::errors::DownloadError;

/// Classified cause of an extraction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    /// Sign-in, login or cookies required
    AuthRequired,

    /// 429 or explicit throttling
    RateLimited,

    /// The post has images but no video
    NoVideo,

    /// Anything else
    Other,
}

impl FailureCause {
    pub fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication required by source",
            Self::RateLimited => "Rate limited by source",
            Self::NoVideo => "No video in post",
            Self::Other => "Extraction tool error",
        }
    }

    /// Build the error for this cause carrying the tool message
    pub fn into_error(self, message: String) -> DownloadError {
        match self {
            Self::AuthRequired => DownloadError::UpstreamAuth(message),
            Self::RateLimited => DownloadError::RateLimited(message),
            Self::NoVideo => DownloadError::NoVideoInPost(message),
            Self::Other => DownloadError::Extraction(message),
        }
    }
}

lazy_static! {
    /// Evaluated top to bottom; order is part of the contract
    static ref PATTERNS: Vec<(Regex, FailureCause)> = vec![
        (
            pattern(r"(sign|log)[ -]?in (is )?required|requires? (a )?(login|sign[ -]?in|authentication)|login_required|use --cookies|account authentication is required|you need to log in"),
            FailureCause::AuthRequired,
        ),
        (
            pattern(r"\b429\b|too many requests|rate[ -]?limit"),
            FailureCause::RateLimited,
        ),
        (
            pattern(r"no video (in|found in|could be found in) this (post|tweet)|there is no video|no video formats found|does not contain (a )?video"),
            FailureCause::NoVideo,
        ),
    ];
}

fn pattern(source: &str) -> Regex {
    // Patterns are static literals covered by the tests below
    match Regex::new(&format!("(?i){}", source)) {
        Ok(re) => re,
        Err(e) => panic!("invalid diagnostic pattern {source:?}: {e}"),
    }
}

/// Analyze tool output and return the failure cause
pub fn diagnose_error(message: &str) -> FailureCause {
    PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(message))
        .map(|(_, cause)| *cause)
        .unwrap_or(FailureCause::Other)
}

/// Classify tool output straight into the error taxonomy
pub fn classify(message: &str) -> DownloadError {
    let cause = diagnose_error(message);
    cause.into_error(first_error_line(message))
}

/// The most useful line of a yt-dlp diagnostic: the first `ERROR:` line, else the last non-empty one
pub fn first_error_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| message.lines().map(str::trim).filter(|l| !l.is_empty()).last())
        .unwrap_or("unknown error")
        .to_string()
}
