// Helper functions shared by the acquisition stages

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::downloader::config::AcquisitionConfig;
use crate::downloader::errors::DownloadError;

/// How long to keep draining pipes after a timed-out child was killed
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Suffixes of intermediate files the extraction tool leaves behind
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Carries whatever the child wrote to stderr before it was killed
    #[error("Timed out after {secs}s")]
    TimedOut { secs: u64, stderr: String },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Text used for diagnostic classification
    pub fn diagnostic_text(&self) -> String {
        match self {
            Self::TimedOut { stderr, .. } if !stderr.trim().is_empty() => {
                format!("{}\n{}", stderr.trim(), self)
            }
            other => other.to_string(),
        }
    }
}

/// Read a pipe to the end, keeping at most `limit` bytes
async fn read_bounded<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(kept)
}

/// Run a program with a structured argument list, a timeout and bounded output capture.
///
/// The child is killed when the timeout fires or when the returned future is dropped.
pub async fn run_output_with_timeout<S: AsRef<OsStr>>(
    program: S,
    args: &[String],
    limit: Duration,
    output_limit: usize,
) -> Result<Output, CommandError> {
    let program_name = program.as_ref().to_string_lossy().to_string();
    let mut child = TokioCommand::new(program.as_ref())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: program_name.clone(),
            source,
        })?;

    // Both pipes are always piped above
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let mut stdout_task = tokio::spawn(async move {
        match stdout_pipe {
            Some(pipe) => read_bounded(pipe, output_limit).await,
            None => Ok(Vec::new()),
        }
    });
    let mut stderr_task = tokio::spawn(async move {
        match stderr_pipe {
            Some(pipe) => read_bounded(pipe, output_limit).await,
            None => Ok(Vec::new()),
        }
    });

    // The deadline covers draining the pipes too: a descendant that inherited
    // them can keep them open after the child itself has exited.
    let mut stdout_buf = None;
    let mut stderr_buf = None;
    let waited = timeout(limit, async {
        let status = child.wait().await;
        stderr_buf = Some(joined(&mut stderr_task).await);
        stdout_buf = Some(joined(&mut stdout_task).await);
        status
    })
    .await;

    match waited {
        Ok(status) => {
            let status = status.map_err(|source| CommandError::Wait {
                program: program_name.clone(),
                source,
            })?;
            Ok(Output {
                status,
                stdout: stdout_buf.unwrap_or_default(),
                stderr: stderr_buf.unwrap_or_default(),
            })
        }
        Err(_) => {
            tracing::warn!(program = %program_name, secs = limit.as_secs(), "command timed out, killing");
            let _ = child.kill().await;
            stdout_task.abort();
            let stderr = match stderr_buf {
                Some(buf) => buf,
                None => match timeout(DRAIN_GRACE, &mut stderr_task).await {
                    Ok(Ok(Ok(buf))) => buf,
                    _ => {
                        stderr_task.abort();
                        Vec::new()
                    }
                },
            };
            Err(CommandError::TimedOut {
                secs: limit.as_secs(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
            })
        }
    }
}

async fn joined(task: &mut JoinHandle<io::Result<Vec<u8>>>) -> Vec<u8> {
    task.await.ok().and_then(Result::ok).unwrap_or_default()
}

/// Build proxy arguments for yt-dlp
pub fn get_proxy_args(config: &AcquisitionConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args
}

/// Build socket timeout arguments for yt-dlp
pub fn get_timeout_args(config: &AcquisitionConfig) -> Vec<String> {
    vec![
        "--socket-timeout".to_string(),
        config.probe_timeout.as_secs().max(1).to_string(),
    ]
}

/// Fresh random token used for scratch prefixes and public names
pub fn random_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Create a private directory under `root` for one request.
///
/// The directory and everything in it is removed when the guard is dropped,
/// including when the request future is cancelled mid-stage.
pub async fn create_request_scratch(root: &Path) -> io::Result<TempDir> {
    tokio::fs::create_dir_all(root).await?;
    tempfile::Builder::new().prefix("req-").tempdir_in(root)
}

/// List completed files in `dir` whose name starts with `prefix`, sorted by name
pub async fn find_by_prefix(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(prefix) || PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        if entry.file_type().await?.is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Delete a file, logging instead of failing
pub async fn remove_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged file");
        }
    }
}

/// Random public filename keeping only the extension
pub fn public_filename(ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        random_token()
    } else {
        format!("{}.{}", random_token(), ext.to_ascii_lowercase())
    }
}

/// Move a staged file into the public directory under a fresh name.
///
/// Uses an atomic rename. When that fails (e.g. across filesystems) the file is
/// copied to a hidden part file in the public directory and renamed from there.
pub async fn promote(staged: &Path, public_dir: &Path, ext: &str) -> Result<(String, PathBuf), DownloadError> {
    promote_to(staged, public_dir, public_filename(ext)).await
}

async fn promote_to(
    staged: &Path,
    public_dir: &Path,
    filename: String,
) -> Result<(String, PathBuf), DownloadError> {
    tokio::fs::create_dir_all(public_dir).await?;
    let target = public_dir.join(&filename);

    if let Err(e) = tokio::fs::rename(staged, &target).await {
        tracing::debug!(error = %e, "rename into public dir failed, copying through part file");
        let part = public_dir.join(format!(".{}.part", filename));
        if let Err(e) = tokio::fs::copy(staged, &part).await {
            remove_best_effort(&part).await;
            return Err(DownloadError::Internal(format!("failed to stage public file: {}", e)));
        }
        if let Err(e) = tokio::fs::rename(&part, &target).await {
            remove_best_effort(&part).await;
            return Err(DownloadError::Internal(format!("failed to publish file: {}", e)));
        }
        remove_best_effort(staged).await;
    }

    Ok((filename, target))
}
