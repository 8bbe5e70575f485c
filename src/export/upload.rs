//! Object-storage upload for the published artifact
//!
//! The upload target is an S3-compatible bucket (Cloudflare R2).
//! Misconfigured credentials or bucket fail loudly; the caller decides
//! whether that fails the run (it does not: the local artifact stands).

use anyhow::{Context, Result};
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::path::Path;

use crate::config::R2Config;

/// Upload collaborator: hands the local artifact to a hosting service
/// and returns a public URL.
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    async fn upload(&self, local_path: &Path, object_key: &str) -> Result<String>;
}

/// Cloudflare R2 uploader over the S3-compatible API
pub struct R2Uploader {
    bucket: Box<Bucket>,
    public_url: String,
}

impl R2Uploader {
    /// Build an uploader from the R2 configuration
    pub fn new(config: &R2Config) -> Result<Self> {
        let region = Region::Custom {
            region: String::from("auto"),
            endpoint: config.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .context("Invalid R2 credentials")?;

        // R2 serves the S3 API path-style only
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .context("Failed to open R2 bucket")?
            .with_path_style();

        Ok(Self {
            bucket: Box::new(bucket),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Public URL an object will be served under after upload
    pub fn public_object_url(&self, object_key: &str) -> String {
        format!("{}/{}", self.public_url, object_key)
    }
}

#[async_trait]
impl ArtifactUploader for R2Uploader {
    async fn upload(&self, local_path: &Path, object_key: &str) -> Result<String> {
        let content = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("Failed to read artifact {}", local_path.display()))?;

        let response = self
            .bucket
            .put_object_with_content_type(object_key, &content, "application/json")
            .await
            .context("R2 upload request failed")?;

        let status = response.status_code();
        anyhow::ensure!(status == 200, "R2 upload returned status {status}");

        let url = self.public_object_url(object_key);
        tracing::info!(url = %url, bytes = content.len(), "Artifact uploaded");
        Ok(url)
    }
}
