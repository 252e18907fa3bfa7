//! Media Upload Gateway
//!
//! Thin client for the remote media store (Cloudinary-style HTTP API).
//! `upload` sends a local temp file and returns the canonical URL plus the
//! store's public id; `remove` deletes a previously stored asset. No
//! retries — a failed call surfaces as `UploadFailed` and the caller
//! decides what to do.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::shared::error::{HomesteadError, Result};

/// A successfully stored asset.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    /// Canonical delivery URL.
    pub url: String,
    /// Store-side identifier, needed for deletion.
    pub public_id: String,
}

/// Media store connection settings.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Base endpoint, e.g. `https://api.cloudinary.com/v1_1/<cloud>/auto`.
    pub base_url: String,
    /// Unsigned upload preset name.
    pub upload_preset: String,
}

pub struct MediaGateway {
    http: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(alias = "url")]
    secure_url: String,
    public_id: String,
}

impl MediaGateway {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Upload a local file to the media store.
    ///
    /// The caller owns the temp file; it must be cleaned up on success and
    /// failure alike (handlers hold a `NamedTempFile`, removed on drop).
    pub async fn upload(&self, path: &Path) -> Result<StoredAsset> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            HomesteadError::upload_failed(format!("Could not read upload file: {}", e))
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .http
            .post(format!("{}/upload", self.config.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| HomesteadError::upload_failed(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HomesteadError::upload_failed(format!(
                "Media store answered {}",
                response.status()
            )));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            HomesteadError::upload_failed(format!("Malformed media store response: {}", e))
        })?;

        info!(public_id = %body.public_id, "asset uploaded");
        Ok(StoredAsset {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    /// Delete a stored asset by its public id.
    pub async fn remove(&self, public_id: &str) -> Result<()> {
        let form = reqwest::multipart::Form::new().text("public_id", public_id.to_string());

        let response = self
            .http
            .post(format!("{}/destroy", self.config.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| HomesteadError::upload_failed(format!("Destroy request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HomesteadError::upload_failed(format!(
                "Media store answered {} on destroy",
                response.status()
            )));
        }

        debug!(public_id, "asset removed");
        Ok(())
    }
}

/// Derive the store-side public id from a delivery URL.
///
/// Delivery URLs look like `https://host/.../upload/v12345/<public_id>.<ext>`
/// (the version segment is optional). An unrecognized URL is an error: the
/// caller must fail its operation rather than silently skip asset cleanup.
pub fn public_id_from_url(url: &str) -> Result<String> {
    let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

    let upload_idx = segments
        .iter()
        .position(|s| *s == "upload")
        .ok_or_else(|| {
            HomesteadError::upload_failed(format!("Unrecognized asset URL: {}", url))
        })?;

    let mut rest: &[&str] = &segments[upload_idx + 1..];

    // Skip a leading version segment like "v1712345678".
    if let Some(first) = rest.first() {
        if first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit())
        {
            rest = &rest[1..];
        }
    }

    if rest.is_empty() {
        return Err(HomesteadError::upload_failed(format!(
            "Unrecognized asset URL: {}",
            url
        )));
    }

    let mut public_id = rest.join("/");

    // Strip the file extension from the last segment.
    if let Some(dot) = public_id.rfind('.') {
        if dot > public_id.rfind('/').map(|s| s + 1).unwrap_or(0) {
            public_id.truncate(dot);
        }
    }

    if public_id.is_empty() {
        return Err(HomesteadError::upload_failed(format!(
            "Unrecognized asset URL: {}",
            url
        )));
    }

    Ok(public_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_versioned_url() {
        let url = "https://res.example.com/demo/image/upload/v1712345678/listings/abc123.jpg";
        assert_eq!(public_id_from_url(url).unwrap(), "listings/abc123");
    }

    #[test]
    fn test_public_id_from_unversioned_url() {
        let url = "https://res.example.com/demo/image/upload/abc123.png";
        assert_eq!(public_id_from_url(url).unwrap(), "abc123");
    }

    #[test]
    fn test_public_id_without_extension() {
        let url = "https://res.example.com/demo/image/upload/v99/abc123";
        assert_eq!(public_id_from_url(url).unwrap(), "abc123");
    }

    #[test]
    fn test_unrecognized_url_is_an_error() {
        // No upload segment: must fail, never silently skip cleanup.
        assert!(public_id_from_url("https://elsewhere.example.com/abc123.jpg").is_err());
        assert!(public_id_from_url("not a url").is_err());
        assert!(public_id_from_url("https://res.example.com/demo/upload/").is_err());
    }
}
