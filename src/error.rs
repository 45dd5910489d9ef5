use thiserror::Error;

use crate::pipeline::RunState;

/// Everything that can abort a pipeline run. None of these are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error: status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("staging {object} failed: {source:#}")]
    Stage {
        object: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("load into {table} failed: {source:#}")]
    Load {
        table: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// The last state the run reached before this error stopped it.
    pub fn reached(&self) -> RunState {
        match self {
            PipelineError::Request { .. } | PipelineError::Status { .. } => RunState::Start,
            PipelineError::Parse(_) | PipelineError::Serialize(_) => RunState::Fetched,
            PipelineError::Stage { .. } => RunState::Flattened,
            PipelineError::Load { .. } => RunState::Staged,
        }
    }
}
