// src/load/bigquery.rs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use google_cloud_bigquery::{
    client::{Client, ClientConfig},
    http::{
        job::{
            get::GetJobRequest, Job, JobConfiguration, JobConfigurationLoad, JobReference,
            JobState, JobType, WriteDisposition,
        },
        table::{
            Clustering, SourceFormat, TableFieldSchema, TableFieldType, TableReference,
            TableSchema, TimePartitionType, TimePartitioning,
        },
        types::ErrorProto,
    },
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use super::{ColumnType, LoadRequest, Loader};
use crate::{error::PipelineError, stage::StagedObject};

/// Submits BigQuery load jobs and polls them until they are `DONE`.
pub struct BigQueryLoader {
    client: Client,
    poll_interval: Duration,
}

impl BigQueryLoader {
    pub async fn new(poll_interval: Duration) -> Result<Self> {
        let (config, _project) = ClientConfig::new_with_auth()
            .await
            .context("authenticating BigQuery client")?;
        let client = Client::new(config)
            .await
            .context("creating BigQuery client")?;
        Ok(Self {
            client,
            poll_interval,
        })
    }

    #[instrument(level = "debug", skip(self, source, request), fields(table = %request.table))]
    async fn run_job(&self, source: &StagedObject, request: &LoadRequest) -> Result<()> {
        let job = load_job(source, request, &job_id(&request.table.table));
        let job_id = job.job_reference.job_id.clone();
        let project = job.job_reference.project_id.clone();

        let created = self
            .client
            .job()
            .create(&job)
            .await
            .with_context(|| format!("submitting load job {}", job_id))?;
        let location = created.job_reference.location.clone();
        info!(job_id = %job_id, uri = %source.uri(), "load job submitted");

        let mut status = created.status;
        // No client-side deadline; the job lifecycle is owned by BigQuery.
        while status.state != JobState::Done {
            sleep(self.poll_interval).await;
            let polled = self
                .client
                .job()
                .get(
                    &project,
                    &job_id,
                    &GetJobRequest {
                        location: location.clone(),
                    },
                )
                .await
                .with_context(|| format!("polling load job {}", job_id))?;
            status = polled.status;
            debug!(job_id = %job_id, state = ?status.state, "polled");
        }

        if let Some(err) = status.error_result {
            let details = status
                .errors
                .unwrap_or_default()
                .iter()
                .map(describe)
                .collect::<Vec<_>>();
            return Err(anyhow!("{}", describe(&err)))
                .with_context(|| format!("load job {} failed [{}]", job_id, details.join("; ")));
        }

        info!(job_id = %job_id, "load job done");
        Ok(())
    }
}

#[async_trait]
impl Loader for BigQueryLoader {
    async fn load(&self, source: &StagedObject, request: &LoadRequest) -> Result<(), PipelineError> {
        self.run_job(source, request)
            .await
            .map_err(|source| PipelineError::Load {
                table: request.table.to_string(),
                source,
            })
    }
}

fn job_id(table: &str) -> String {
    format!("nbp_ingest_{}_{}", table, Utc::now().timestamp_micros())
}

fn load_job(source: &StagedObject, request: &LoadRequest, job_id: &str) -> Job {
    let fields = request
        .schema
        .iter()
        .map(|col| TableFieldSchema {
            name: col.name.to_string(),
            data_type: field_type(col.kind),
            ..Default::default()
        })
        .collect();

    let clustering = if request.clustering.is_empty() {
        None
    } else {
        Some(Clustering {
            fields: request.clustering.iter().map(|c| c.to_string()).collect(),
        })
    };

    Job {
        job_reference: JobReference {
            project_id: request.table.project.clone(),
            job_id: job_id.to_string(),
            ..Default::default()
        },
        configuration: JobConfiguration {
            job: JobType::Load(JobConfigurationLoad {
                source_uris: vec![source.uri()],
                destination_table: TableReference {
                    project_id: request.table.project.clone(),
                    dataset_id: request.table.dataset.clone(),
                    table_id: request.table.table.clone(),
                },
                schema: Some(TableSchema { fields }),
                source_format: Some(SourceFormat::NewlineDelimitedJson),
                write_disposition: Some(WriteDisposition::WriteTruncate),
                time_partitioning: Some(TimePartitioning {
                    partition_type: TimePartitionType::Day,
                    field: Some(request.partition_field.to_string()),
                    ..Default::default()
                }),
                clustering,
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn field_type(kind: ColumnType) -> TableFieldType {
    match kind {
        ColumnType::String => TableFieldType::String,
        ColumnType::Date => TableFieldType::Date,
        ColumnType::Numeric => TableFieldType::Numeric,
    }
}

fn describe(err: &ErrorProto) -> String {
    let reason = err.reason.as_deref().unwrap_or("error");
    match &err.message {
        Some(msg) => format!("{}: {}", reason, msg),
        None => reason.to_string(),
    }
}
