// src/app.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::{future::Future, process::ExitCode, time::Duration};
use tokio::sync::OnceCell;
use tracing::info;

use crate::{
    config::IngestConfig,
    error::PipelineError,
    fetch::{HttpSource, Source},
    load::{bigquery::BigQueryLoader, LoadRequest, Loader},
    logging,
    pipeline::{
        self,
        jobs::{exchange_rates_job, gold_history_job, today},
        status_line,
    },
    stage::{gcs::GcsStager, StagedObject, Stager},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    ExchangeRates,
    GoldHistory,
}

/// The three external services a run talks to.
pub struct Collaborators<S, T, L> {
    pub source: S,
    pub stager: T,
    pub loader: L,
}

/// A client that is only built the first time it is used, so a run that
/// fails to fetch or flatten never touches cloud credentials.
pub struct Lazy<T, F> {
    cell: OnceCell<T>,
    connect: F,
}

impl<T, F, Fut> Lazy<T, F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    pub fn new(connect: F) -> Self {
        Self {
            cell: OnceCell::new(),
            connect,
        }
    }

    pub async fn get(&self) -> Result<&T> {
        self.cell.get_or_try_init(|| (self.connect)()).await
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl<T, F, Fut> Stager for Lazy<T, F>
where
    T: Stager,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
{
    async fn stage(&self, name: &str, payload: Vec<u8>) -> Result<StagedObject, PipelineError> {
        let stager = self
            .get()
            .await
            .context("connecting to object store")
            .map_err(|source| PipelineError::Stage {
                object: name.to_string(),
                source,
            })?;
        stager.stage(name, payload).await
    }
}

#[async_trait]
impl<T, F, Fut> Loader for Lazy<T, F>
where
    T: Loader,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
{
    async fn load(&self, source: &StagedObject, request: &LoadRequest) -> Result<(), PipelineError> {
        let loader = self
            .get()
            .await
            .context("connecting to warehouse")
            .map_err(|err| PipelineError::Load {
                table: request.table.to_string(),
                source: err,
            })?;
        loader.load(source, request).await
    }
}

/// Run one pipeline end to end and render its status line.
pub async fn run_pipeline<S, T, L>(
    cfg: &IngestConfig,
    which: Pipeline,
    collab: &Collaborators<S, T, L>,
) -> Result<String>
where
    S: Source,
    T: Stager,
    L: Loader,
{
    let date = today();
    let Collaborators {
        source,
        stager,
        loader,
    } = collab;

    let status = match which {
        Pipeline::ExchangeRates => {
            let job = exchange_rates_job(cfg).context("building exchange rates job")?;
            info!(pipeline = job.label(), url = %job.url, "starting");
            status_line(&pipeline::run(&job, date, source, stager, loader).await)
        }
        Pipeline::GoldHistory => {
            let job = gold_history_job(cfg).context("building gold history job")?;
            info!(pipeline = job.label(), url = %job.url, "starting");
            status_line(&pipeline::run(&job, date, source, stager, loader).await)
        }
    };
    Ok(status)
}

/// Shared `main` for the entry points: prints one status line per pipeline.
pub async fn main_for(pipelines: &[Pipeline]) -> ExitCode {
    logging::init();
    info!(?pipelines, "startup");

    let prepared = IngestConfig::load().and_then(|cfg| {
        let client = Client::builder()
            .gzip(true)
            .build()
            .context("building HTTP client")?;
        Ok((cfg, HttpSource::new(client)))
    });
    let (cfg, source) = match prepared {
        Ok(ready) => ready,
        Err(err) => {
            println!("❌ {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    info!(
        bucket = %cfg.bucket,
        exchange_rates = %cfg.table_id(&cfg.exchange_rates.table),
        gold = %cfg.table_id(&cfg.gold.table),
        "config loaded"
    );

    let bucket = cfg.bucket.clone();
    let poll_interval = Duration::from_millis(cfg.poll_interval_ms);
    let collab = Collaborators {
        source,
        stager: Lazy::new(move || GcsStager::new(bucket.clone())),
        loader: Lazy::new(move || BigQueryLoader::new(poll_interval)),
    };

    let mut failed = false;
    for &which in pipelines {
        let status = match run_pipeline(&cfg, which, &collab).await {
            Ok(status) => status,
            Err(err) => format!("❌ {:#}", err),
        };
        failed |= status.starts_with('❌');
        println!("{}", status);
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
