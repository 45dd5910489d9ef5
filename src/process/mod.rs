// src/process/mod.rs

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PipelineError;

pub mod exchange_rates;
pub mod gold;

/// One flattenable API response shape and the flat records it produces.
pub trait Dataset {
    /// Top-level JSON document returned by the API.
    type Response: DeserializeOwned;
    /// One output row; field order is the serialized column order.
    type Record: Serialize;

    /// Short label used in logs and status messages.
    const LABEL: &'static str;

    fn flatten(response: Self::Response) -> Vec<Self::Record>;
}

/// Parse a raw body and flatten it, keeping encounter order.
pub fn parse_and_flatten<D: Dataset>(body: &[u8]) -> Result<Vec<D::Record>, PipelineError> {
    let response: D::Response = serde_json::from_slice(body).map_err(PipelineError::Parse)?;
    Ok(D::flatten(response))
}

/// One JSON object per line, `\n`-joined, no trailing newline.
pub fn to_ndjson<R: Serialize>(records: &[R]) -> Result<String, PipelineError> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PipelineError::Serialize)?;
    Ok(lines.join("\n"))
}
