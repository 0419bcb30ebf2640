// HTTP boundary - thin axum router over the acquirer

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::downloader::models::{AcquisitionMethod, ArtifactInfo, FinalArtifact, MediaKind};
use crate::downloader::{Acquirer, AcquisitionRequest, DownloadError};

pub type AppState = Arc<Acquirer>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub media_url: String,
    pub media_type: MediaKind,
    pub size: u64,
    pub method: AcquisitionMethod,
    pub info: ArtifactInfo,
}

impl From<FinalArtifact> for DownloadResponse {
    fn from(artifact: FinalArtifact) -> Self {
        let message = match artifact.kind {
            MediaKind::Video => "Video downloaded successfully",
            MediaKind::Image => "Image downloaded successfully",
        };
        Self {
            success: true,
            message: message.to_string(),
            media_url: format!("/media/{}", artifact.filename),
            filename: artifact.filename,
            media_type: artifact.kind,
            size: artifact.size,
            method: artifact.method,
            info: artifact.info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Maps a `DownloadError` onto its HTTP status and error body
#[derive(Debug)]
pub struct ApiError(pub DownloadError);

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            success: false,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(acquirer: AppState) -> Router {
    Router::new()
        .route("/api/media/download", post(download))
        .route("/api/media/capabilities", get(capabilities))
        .with_state(acquirer)
}

async fn download(
    State(acquirer): State<AppState>,
    body: Result<Json<AcquisitionRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let Json(request) = body.map_err(|e| DownloadError::Validation(e.body_text()))?;
    let artifact = acquirer.acquire(&request).await?;
    Ok(Json(artifact.into()))
}

async fn capabilities(State(acquirer): State<AppState>) -> impl IntoResponse {
    Json(acquirer.capabilities().await)
}

pub async fn serve(addr: SocketAddr, acquirer: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "media downloader listening");
    axum::serve(listener, router(acquirer)).await
}
