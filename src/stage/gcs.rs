// src/stage/gcs.rs

use anyhow::Context;
use async_trait::async_trait;
use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::objects::upload::{Media, UploadObjectRequest, UploadType},
};
use tracing::info;

use super::{StagedObject, Stager, NDJSON_CONTENT_TYPE};
use crate::error::PipelineError;

/// Stages payloads into a single GCS bucket using Application Default Credentials.
pub struct GcsStager {
    client: Client,
    bucket: String,
}

impl GcsStager {
    pub async fn new(bucket: impl Into<String>) -> anyhow::Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .context("authenticating to GCS")?;
        Ok(Self {
            client: Client::new(config),
            bucket: bucket.into(),
        })
    }
}

#[async_trait]
impl Stager for GcsStager {
    async fn stage(&self, name: &str, payload: Vec<u8>) -> Result<StagedObject, PipelineError> {
        let len = payload.len();
        let mut media = Media::new(name.to_string());
        media.content_type = NDJSON_CONTENT_TYPE.into();
        media.content_length = Some(len as u64);

        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&request, payload, &UploadType::Simple(media))
            .await
            .with_context(|| format!("uploading to gs://{}/{}", self.bucket, name))
            .map_err(|source| PipelineError::Stage {
                object: name.to_string(),
                source,
            })?;

        let staged = StagedObject {
            bucket: self.bucket.clone(),
            name: name.to_string(),
        };
        info!(uri = %staged.uri(), bytes = len, "staged");
        Ok(staged)
    }
}
