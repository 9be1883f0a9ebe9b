//! Image upload collaborator.
use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config;
use crate::error::ShowcaseError;

/// Where an uploaded image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub url: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaUpload, ShowcaseError>;
}

#[derive(Clone)]
pub struct HttpMediaStore {
    http: Client,
    upload_url: Url,
    api_key: String,
    folder: String,
}

impl fmt::Debug for HttpMediaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMediaStore")
            .field("upload_url", &self.upload_url)
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl HttpMediaStore {
    pub fn from_config(cfg: &config::Media) -> Result<Self, ShowcaseError> {
        let upload_url = Url::parse(&cfg.upload_url)
            .map_err(|e| ShowcaseError::Transport(format!("invalid media upload URL: {e}")))?;
        let http = Client::builder()
            .user_agent("showcase/0.1")
            .build()
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            upload_url,
            api_key: cfg.api_key.clone(),
            folder: cfg.folder.clone(),
        })
    }
}

/// Unique public id for an upload: sanitized file stem plus a random suffix.
pub fn public_id(file_name: &str) -> String {
    let stem: String = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };
    format!("{stem}-{}", Uuid::new_v4().simple())
}

pub fn content_type(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn parse_upload_response(body: &str) -> Result<MediaUpload, ShowcaseError> {
    let payload: UploadResponse = serde_json::from_str(body)
        .map_err(|e| ShowcaseError::Transport(format!("invalid media response: {e}")))?;
    payload
        .secure_url
        .or(payload.url)
        .map(|url| MediaUpload { url })
        .ok_or_else(|| ShowcaseError::Transport("media response carried no URL".into()))
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaUpload, ShowcaseError> {
        if bytes.is_empty() {
            return Err(ShowcaseError::validation("No file provided"));
        }
        let size = bytes.len();
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type(file_name))
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("folder", self.folder.clone())
            .text("public_id", public_id(file_name));

        let res = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(%status, body = %body, "media upload failed");
            return Err(ShowcaseError::Transport(format!(
                "media service returned {status}"
            )));
        }
        let upload = parse_upload_response(&body)?;
        info!(file_name, size, url = %upload.url, "uploaded media");
        Ok(upload)
    }
}
