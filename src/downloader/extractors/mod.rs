// Extractors - tool-backed acquisition paths
//
// - cli: drives the native `yt-dlp` binary (video download and image capture)
// - diagnostics: maps yt-dlp diagnostic text onto the error taxonomy

mod cli;
mod diagnostics;
mod traits;

pub use cli::{ImageAttempt, YtDlpExtractor};
pub use diagnostics::{classify, diagnose_error, FailureCause};
pub use traits::MediaExtractor;
