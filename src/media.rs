//! Media CDN access: the [`MediaStore`] seam and a Cloudinary-compatible client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::MediaConfig;
use crate::forms::uploads::ImageFile;

/// Fixed transformation applied to every product image.
pub const IMAGE_TRANSFORMATION: &str = "c_limit,w_1200,h_1200/q_auto/f_auto";
/// Upper bound for a single call to the media store.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("media store answered {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("unexpected media store response: {0}")]
    Decode(String),
}

/// Asset stored on the CDN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

/// Remote image storage used by the upload and delete paths.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file: &ImageFile) -> Result<StoredMedia, MediaError>;
    /// Delete an asset. Deleting an asset that no longer exists succeeds.
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Signed-upload client for the Cloudinary REST API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: MediaConfig,
    base_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        let base_url = format!(
            "https://api.cloudinary.com/v1_1/{}/image",
            config.cloud_name
        );
        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn error_from(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error message".to_string(),
        };
        MediaError::Upstream { status, message }
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, file: &ImageFile) -> Result<StoredMedia, MediaError> {
        let timestamp = Self::timestamp();
        let signature = sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
                ("transformation", IMAGE_TRANSFORMATION),
            ],
            &self.config.api_secret,
        );

        let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("transformation", IMAGE_TRANSFORMATION)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| MediaError::Decode(err.to_string()))?;

        Ok(StoredMedia {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Self::timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(format!("{}/destroy", self.base_url))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|err| MediaError::Decode(err.to_string()))?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::Decode(format!("destroy result `{other}`"))),
        }
    }
}

/// Request signature: parameters sorted by name, joined as `k=v&...`, suffixed
/// with the API secret and hashed with SHA-256.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
