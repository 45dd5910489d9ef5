// src/pipeline/mod.rs

use chrono::NaiveDate;
use std::marker::PhantomData;
use tracing::{error, info, instrument};

use crate::{
    error::PipelineError,
    fetch::Source,
    load::{LoadRequest, Loader},
    process::{parse_and_flatten, to_ndjson, Dataset},
    stage::{object_name, Stager},
};

pub mod jobs;

/// Progress of a single run. A run only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Start,
    Fetched,
    Flattened,
    Staged,
    Loaded,
}

/// Everything one pipeline needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineJob<D: Dataset> {
    pub url: String,
    pub object_prefix: String,
    pub load: LoadRequest,
    dataset: PhantomData<D>,
}

impl<D: Dataset> PipelineJob<D> {
    pub fn new(url: impl Into<String>, object_prefix: impl Into<String>, load: LoadRequest) -> Self {
        Self {
            url: url.into(),
            object_prefix: object_prefix.into(),
            load,
            dataset: PhantomData,
        }
    }

    pub fn label(&self) -> &'static str {
        D::LABEL
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub label: &'static str,
    pub records: usize,
    pub object: String,
    pub uri: String,
    pub table: String,
}

impl RunReport {
    pub fn message(&self) -> String {
        format!(
            "✅ Downloaded {} ({} records), saved as {}, and loaded to {}",
            self.label, self.records, self.object, self.table
        )
    }
}

/// Fetch, flatten, stage and load, in that order, stopping at the first error.
#[instrument(skip_all, fields(pipeline = job.label(), table = %job.load.table))]
pub async fn run<D, S, T, L>(
    job: &PipelineJob<D>,
    today: NaiveDate,
    source: &S,
    stager: &T,
    loader: &L,
) -> Result<RunReport, PipelineError>
where
    D: Dataset,
    S: Source + ?Sized,
    T: Stager + ?Sized,
    L: Loader + ?Sized,
{
    let result = async {
        let body = source.fetch(&job.url).await?;
        advance(RunState::Fetched);

        let records = parse_and_flatten::<D>(&body)?;
        let payload = to_ndjson(&records)?;
        advance(RunState::Flattened);
        info!(records = records.len(), bytes = payload.len(), "flattened");

        let name = object_name(&job.object_prefix, today);
        let staged = stager.stage(&name, payload.into_bytes()).await?;
        advance(RunState::Staged);

        loader.load(&staged, &job.load).await?;
        advance(RunState::Loaded);

        Ok::<_, PipelineError>(RunReport {
            label: job.label(),
            records: records.len(),
            uri: staged.uri(),
            object: staged.name,
            table: job.load.table.to_string(),
        })
    }
    .await;

    match &result {
        Ok(report) => info!(uri = %report.uri, records = report.records, "run complete"),
        Err(err) => error!(reached = ?err.reached(), error = %err, "run failed"),
    }
    result
}

fn advance(state: RunState) {
    info!(state = ?state, "advanced");
}

/// Status line printed by the entry points.
pub fn status_line(result: &Result<RunReport, PipelineError>) -> String {
    match result {
        Ok(report) => report.message(),
        Err(err) => format!("❌ {}", err),
    }
}
