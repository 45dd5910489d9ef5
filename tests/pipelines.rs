use async_trait::async_trait;
use chrono::NaiveDate;
use nbp_ingest::{
    app::{run_pipeline, Collaborators, Pipeline},
    config::IngestConfig,
    fetch::Source,
    load::{LoadRequest, Loader},
    pipeline::{
        self,
        jobs::{exchange_rates_job, gold_history_job},
        status_line, RunState,
    },
    stage::{StagedObject, Stager},
    PipelineError,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

const TABLE_A: &str = r#"[{"table":"A","no":"100/A/NBP/2024","effectiveDate":"2024-01-02","rates":[{"currency":"dolar amerykański","code":"USD","mid":4.0},{"currency":"euro","code":"EUR","mid":4.3}]}]"#;
const GOLD: &str = r#"[{"data":"2024-01-02","cena":250.5},{"cena":251.0},{"data":"2024-01-03","cena":252.17}]"#;

/// Canned HTTP responses keyed by URL; unknown URLs answer 404.
#[derive(Default)]
struct FakeApi {
    bodies: HashMap<String, Result<String, u16>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn with(mut self, url: &str, response: Result<&str, u16>) -> Self {
        self.bodies
            .insert(url.to_string(), response.map(str::to_string));
        self
    }
}

#[async_trait]
impl Source for FakeApi {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.bodies.get(url) {
            Some(Ok(body)) => Ok(body.clone().into_bytes()),
            Some(Err(status)) => Err(PipelineError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(PipelineError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// In-memory bucket plus a warehouse that keeps the last committed payload per table.
#[derive(Default, Clone)]
struct FakeCloud {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    tables: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    loads: Arc<Mutex<Vec<LoadRequest>>>,
    reject_loads: bool,
}

#[async_trait]
impl Stager for FakeCloud {
    async fn stage(&self, name: &str, payload: Vec<u8>) -> Result<StagedObject, PipelineError> {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), payload);
        Ok(StagedObject {
            bucket: "nbp-upload-temp".into(),
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl Loader for FakeCloud {
    async fn load(&self, src: &StagedObject, req: &LoadRequest) -> Result<(), PipelineError> {
        self.loads.lock().unwrap().push(req.clone());
        if self.reject_loads {
            return Err(PipelineError::Load {
                table: req.table.to_string(),
                source: anyhow::anyhow!("invalid: Could not parse 'abc' as NUMERIC"),
            });
        }
        let payload = self.objects.lock().unwrap()[&src.name].clone();
        // truncate-and-replace
        self.tables
            .lock()
            .unwrap()
            .insert(req.table.to_string(), payload);
        Ok(())
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

#[tokio::test]
async fn exchange_rates_end_to_end() {
    let cfg = IngestConfig::default();
    let job = exchange_rates_job(&cfg).unwrap();
    let api = FakeApi::default().with(&job.url, Ok(TABLE_A));
    let cloud = FakeCloud::default();

    let result = pipeline::run(&job, day(), &api, &cloud, &cloud).await;
    let report = result.as_ref().unwrap();
    assert_eq!(report.records, 2);
    assert_eq!(report.object, "fx_today_2024-01-02.ndjson");

    let objects = cloud.objects.lock().unwrap();
    let payload = String::from_utf8(objects["fx_today_2024-01-02.ndjson"].clone()).unwrap();
    assert_eq!(
        payload,
        [
            r#"{"table_type":"A","effective_date":"2024-01-02","currency":"dolar amerykański","code":"USD","mid":4.0}"#,
            r#"{"table_type":"A","effective_date":"2024-01-02","currency":"euro","code":"EUR","mid":4.3}"#,
        ]
        .join("\n")
    );

    let loads = cloud.loads.lock().unwrap();
    assert_eq!(loads[0].clustering, vec!["code"]);
    assert_eq!(
        loads[0].table.to_string(),
        "nbpcurrencyratesbdfinalproject.nbp_data_raw.fx_today_raw"
    );

    let line = status_line(&result);
    assert!(line.starts_with("✅"), "{}", line);
    assert!(line.contains("fx_today_2024-01-02.ndjson"));
    assert!(line.contains("nbp_data_raw.fx_today_raw"));
}

#[tokio::test]
async fn gold_drops_incomplete_quotes() {
    let cfg = IngestConfig::default();
    let job = gold_history_job(&cfg).unwrap();
    let api = FakeApi::default().with(&job.url, Ok(GOLD));
    let cloud = FakeCloud::default();

    let report = pipeline::run(&job, day(), &api, &cloud, &cloud)
        .await
        .unwrap();
    assert_eq!(report.records, 2);

    let tables = cloud.tables.lock().unwrap();
    let loaded = String::from_utf8(tables[&report.table].clone()).unwrap();
    assert_eq!(
        loaded,
        "{\"effective_date\":\"2024-01-02\",\"price\":250.5}\n{\"effective_date\":\"2024-01-03\",\"price\":252.17}"
    );
    assert!(cloud.loads.lock().unwrap()[0].clustering.is_empty());
}

#[tokio::test]
async fn server_error_skips_stage_and_load() {
    let cfg = IngestConfig::default();
    let job = gold_history_job(&cfg).unwrap();
    let api = FakeApi::default().with(&job.url, Err(500));
    let cloud = FakeCloud::default();

    let result = pipeline::run(&job, day(), &api, &cloud, &cloud).await;

    assert_eq!(result.as_ref().unwrap_err().reached(), RunState::Start);
    let line = status_line(&result);
    assert!(line.starts_with("❌"));
    assert!(line.contains("500"));
    assert!(cloud.objects.lock().unwrap().is_empty());
    assert!(cloud.loads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_load_keeps_last_committed_table() {
    let cfg = IngestConfig::default();
    let job = exchange_rates_job(&cfg).unwrap();
    let api = FakeApi::default().with(&job.url, Ok(TABLE_A));
    let table = job.load.table.to_string();

    let cloud = FakeCloud {
        reject_loads: true,
        ..Default::default()
    };
    cloud
        .tables
        .lock()
        .unwrap()
        .insert(table.clone(), b"previous".to_vec());

    let result = pipeline::run(&job, day(), &api, &cloud, &cloud).await;

    let err = result.as_ref().unwrap_err();
    assert_eq!(err.reached(), RunState::Staged);
    assert!(status_line(&result).contains("NUMERIC"));
    assert_eq!(cloud.tables.lock().unwrap()[&table], b"previous".to_vec());
    // staging already happened; the object is left behind
    assert_eq!(cloud.objects.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let cfg = IngestConfig::default();
    let job = gold_history_job(&cfg).unwrap();
    let api = FakeApi::default().with(&job.url, Ok(GOLD));
    let cloud = FakeCloud::default();

    pipeline::run(&job, day(), &api, &cloud, &cloud)
        .await
        .unwrap();
    let first = cloud.tables.lock().unwrap().clone();
    let first_object = cloud.objects.lock().unwrap().clone();

    pipeline::run(&job, day(), &api, &cloud, &cloud)
        .await
        .unwrap();
    assert_eq!(*cloud.tables.lock().unwrap(), first);
    assert_eq!(*cloud.objects.lock().unwrap(), first_object);
    assert_eq!(cloud.objects.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn pipelines_run_independently() {
    let cfg = IngestConfig::default();
    let fx_url = exchange_rates_job(&cfg).unwrap().url;
    let gold_url = gold_history_job(&cfg).unwrap().url;
    let api = FakeApi::default()
        .with(&fx_url, Err(503))
        .with(&gold_url, Ok(GOLD));
    let cloud = FakeCloud::default();
    let collab = Collaborators {
        source: api,
        stager: cloud.clone(),
        loader: cloud,
    };

    let fx = run_pipeline(&cfg, Pipeline::ExchangeRates, &collab)
        .await
        .unwrap();
    assert!(fx.starts_with("❌") && fx.contains("503"), "{}", fx);

    let gold = run_pipeline(&cfg, Pipeline::GoldHistory, &collab)
        .await
        .unwrap();
    assert!(gold.starts_with("✅"), "{}", gold);

    assert_eq!(*collab.source.calls.lock().unwrap(), vec![fx_url, gold_url]);
}
