// In-process fakes for the prober, extractor and fetcher seams

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::config::AcquisitionConfig;
use super::direct::{DirectFetcher, FetchedMedia};
use super::errors::DownloadError;
use super::extractors::MediaExtractor;
use super::models::{CapabilitySnapshot, MediaDescriptor, Multiplicity, StagedArtifact};
use super::orchestrator::Acquirer;
use super::tools::CapabilityProber;

pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub struct FixedProber {
    pub snapshot: CapabilitySnapshot,
    pub probes: Arc<AtomicUsize>,
}

#[async_trait]
impl CapabilityProber for FixedProber {
    async fn probe(&self) -> CapabilitySnapshot {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.snapshot
    }
}

#[derive(Debug, Clone)]
pub enum VideoBehavior {
    /// Write a staged file with this extension and body
    Produce(&'static str, &'static [u8]),
    /// Leave a partial download behind and never finish
    Stall(&'static str),
    Fail(DownloadError),
}

#[derive(Debug, Clone)]
pub enum ImageBehavior {
    /// Write this many staged jpg files
    Produce(usize),
    Fail(DownloadError),
}

pub struct FakeExtractor {
    pub video: VideoBehavior,
    pub images: ImageBehavior,
    pub calls: CallLog,
}

fn descriptor(ext: &str) -> MediaDescriptor {
    MediaDescriptor {
        source_url: "https://example.com/post/1".to_string(),
        ext: ext.to_string(),
        title: "Example post".to_string(),
        thumbnail: Some("https://example.com/thumb.jpg".to_string()),
        duration: Some(9.5),
        filesize: None,
        format_id: None,
        width: Some(1280),
        height: Some(720),
        multiplicity: Multiplicity::Single,
    }
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(
        &self,
        _url: &str,
        _capabilities: &CapabilitySnapshot,
        scratch: &Path,
    ) -> Result<StagedArtifact, DownloadError> {
        self.calls.lock().unwrap().push("extract");
        match &self.video {
            VideoBehavior::Produce(ext, body) => {
                let path = scratch.join(format!("video.{}", ext));
                std::fs::write(&path, body).unwrap();
                Ok(StagedArtifact {
                    path,
                    descriptor: Some(descriptor(ext)),
                })
            }
            VideoBehavior::Stall(ext) => {
                std::fs::write(scratch.join(format!("video.{}.part", ext)), b"partial").unwrap();
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Err(DownloadError::Extraction("stalled".to_string()))
            }
            VideoBehavior::Fail(e) => Err(e.clone()),
        }
    }

    async fn extract_images(&self, _url: &str, scratch: &Path) -> Result<Vec<StagedArtifact>, DownloadError> {
        self.calls.lock().unwrap().push("extract_images");
        match &self.images {
            ImageBehavior::Produce(count) => Ok((1..=*count)
                .map(|i| {
                    let path = scratch.join(format!("img_{:05}.jpg", i));
                    std::fs::write(&path, b"jpeg").unwrap();
                    StagedArtifact { path, descriptor: None }
                })
                .collect()),
            ImageBehavior::Fail(e) => Err(e.clone()),
        }
    }
}

pub struct FakeFetcher {
    pub result: Result<FetchedMedia, DownloadError>,
    pub calls: CallLog,
}

#[async_trait]
impl DirectFetcher for FakeFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedMedia, DownloadError> {
        self.calls.lock().unwrap().push("fetch");
        self.result.clone()
    }
}

pub fn fetched(content_type: &str, body: &[u8]) -> Result<FetchedMedia, DownloadError> {
    Ok(FetchedMedia {
        bytes: body.to_vec(),
        content_type: Some(content_type.to_string()),
    })
}

/// An acquirer wired to fakes, with its own public and scratch directories
pub struct Harness {
    pub acquirer: Arc<Acquirer>,
    pub calls: CallLog,
    pub probes: Arc<AtomicUsize>,
    pub public_dir: PathBuf,
    pub scratch_dir: PathBuf,
    _root: tempfile::TempDir,
}

impl Harness {
    pub fn new(
        snapshot: CapabilitySnapshot,
        video: VideoBehavior,
        images: ImageBehavior,
        fetch: Result<FetchedMedia, DownloadError>,
    ) -> Self {
        let root = tempfile::tempdir().unwrap();
        let public_dir = root.path().join("public");
        let scratch_dir = root.path().join("scratch");
        let config = AcquisitionConfig::default()
            .with_public_dir(&public_dir)
            .with_scratch_dir(&scratch_dir);

        let calls: CallLog = Arc::default();
        let probes = Arc::new(AtomicUsize::new(0));
        let acquirer = Arc::new(Acquirer::new(
            Arc::new(config),
            Box::new(FixedProber {
                snapshot,
                probes: probes.clone(),
            }),
            Box::new(FakeExtractor {
                video,
                images,
                calls: calls.clone(),
            }),
            Box::new(FakeFetcher {
                result: fetch,
                calls: calls.clone(),
            }),
        ));

        Self {
            acquirer,
            calls,
            probes,
            public_dir,
            scratch_dir,
            _root: root,
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn public_files(&self) -> usize {
        count_entries(&self.public_dir)
    }

    pub fn scratch_entries(&self) -> usize {
        count_entries(&self.scratch_dir)
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
