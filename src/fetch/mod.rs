// src/fetch/mod.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::error::PipelineError;

pub mod urls;

/// Something that can GET a URL and hand back the raw body.
#[async_trait]
pub trait Source: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PipelineError>;
}

/// Plain unauthenticated HTTP source backed by `reqwest`.
#[derive(Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let request_err = |source| PipelineError::Request {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(request_err)?;
        check_status(url, resp.status())?;

        let bytes = resp.bytes().await.map_err(request_err)?;
        info!(url = %url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

/// Any non-2xx status aborts the run; there is no retry.
pub fn check_status(url: &str, status: StatusCode) -> Result<(), PipelineError> {
    if status.is_success() {
        debug!(url = %url, status = status.as_u16(), "status ok");
        Ok(())
    } else {
        Err(PipelineError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
