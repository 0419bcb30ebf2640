// Direct fetch fallback - plain HTTP GET with browser-like headers

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};

use crate::downloader::config::{AcquisitionConfig, BROWSER_USER_AGENT};
use crate::downloader::errors::DownloadError;

/// Body and declared content type of a direct fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Last-resort fetch of the URL itself
#[async_trait]
pub trait DirectFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, DownloadError>;
}

/// File extension (with dot) for a declared content type
pub fn infer_extension(content_type: Option<&str>) -> &'static str {
    let Some(raw) = content_type else {
        return ".bin";
    };
    // Drop parameters such as `; charset=binary`
    let mime = raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

    match mime.as_str() {
        "video/mp4" => ".mp4",
        "video/quicktime" => ".mov",
        "video/webm" => ".webm",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        m if m.starts_with("video/") => ".mp4",
        m if m.starts_with("image/") => ".jpg",
        _ => ".bin",
    }
}

fn fetch_error(status: Option<u16>, message: impl Into<String>) -> DownloadError {
    DownloadError::DirectFetch {
        status,
        message: message.into(),
    }
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &AcquisitionConfig) -> Result<Self, DownloadError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(BROWSER_USER_AGENT);

        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| DownloadError::Internal(format!("invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| DownloadError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_fetch_bytes,
        })
    }
}

#[async_trait]
impl DirectFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, DownloadError> {
        let mut response = self
            .client
            .get(url)
            .header(REFERER, url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| fetch_error(None, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(Some(status.as_u16()), format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(fetch_error(
                    None,
                    format!("response too large: {} bytes (max {})", len, self.max_bytes),
                ));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| fetch_error(None, format!("failed to read body: {}", e)))?
        {
            if bytes.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(fetch_error(
                    None,
                    format!("response too large (max {} bytes)", self.max_bytes),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(bytes = bytes.len(), content_type = ?content_type, "direct fetch complete");
        Ok(FetchedMedia { bytes, content_type })
    }
}
