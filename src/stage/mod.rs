// src/stage/mod.rs

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PipelineError;

pub mod gcs;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// A written staging object, addressable by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedObject {
    pub bucket: String,
    pub name: String,
}

impl StagedObject {
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Writes a whole payload as one named object, replacing any previous one.
#[async_trait]
pub trait Stager: Send + Sync {
    async fn stage(&self, name: &str, payload: Vec<u8>) -> Result<StagedObject, PipelineError>;
}

/// `{prefix}_{YYYY-MM-DD}.ndjson`
pub fn object_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.ndjson", prefix, date.format("%Y-%m-%d"))
}
