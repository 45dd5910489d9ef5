// src/config.rs

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

/// Env var naming an optional YAML file that overrides the built-in settings.
pub const CONFIG_ENV: &str = "NBP_INGEST_CONFIG";

/// Tables of the NBP exchange-rate API that publish a `mid` rate.
const MID_RATE_TABLES: &[&str] = &["A", "B"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Base of the NBP web API, without trailing slash.
    pub api_base: String,
    /// GCS bucket the NDJSON files are staged in.
    pub bucket: String,
    /// BigQuery project and dataset holding both raw tables.
    pub project: String,
    pub dataset: String,
    /// How often a running load job is polled.
    pub poll_interval_ms: u64,
    pub exchange_rates: ExchangeRatesConfig,
    pub gold: GoldConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExchangeRatesConfig {
    pub table_type: String,
    pub table: String,
    pub object_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoldConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub table: String,
    pub object_prefix: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.nbp.pl/api".into(),
            bucket: "nbp-upload-temp".into(),
            project: "nbpcurrencyratesbdfinalproject".into(),
            dataset: "nbp_data_raw".into(),
            poll_interval_ms: 1_000,
            exchange_rates: ExchangeRatesConfig::default(),
            gold: GoldConfig::default(),
        }
    }
}

impl Default for ExchangeRatesConfig {
    fn default() -> Self {
        Self {
            table_type: "A".into(),
            table: "fx_today_raw".into(),
            object_prefix: "fx_today".into(),
        }
    }
}

impl Default for GoldConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2013, 1, 1).expect("valid literal date"),
            end: NaiveDate::from_ymd_opt(2025, 5, 26).expect("valid literal date"),
            table: "gold_history_raw".into(),
            object_prefix: "gold_history".into(),
        }
    }
}

impl IngestConfig {
    /// Built-in defaults, overridden by the YAML file named in `NBP_INGEST_CONFIG` if set.
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw).context("parsing YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("api_base", &self.api_base),
            ("bucket", &self.bucket),
            ("project", &self.project),
            ("dataset", &self.dataset),
            ("exchange_rates.table", &self.exchange_rates.table),
            ("exchange_rates.object_prefix", &self.exchange_rates.object_prefix),
            ("gold.table", &self.gold.table),
            ("gold.object_prefix", &self.gold.object_prefix),
        ] {
            if value.trim().is_empty() {
                bail!("{} must not be empty", field);
            }
        }

        if !MID_RATE_TABLES.contains(&self.exchange_rates.table_type.as_str()) {
            bail!(
                "exchange_rates.table_type must be one of {:?}, got {:?}",
                MID_RATE_TABLES,
                self.exchange_rates.table_type
            );
        }
        if self.gold.start > self.gold.end {
            bail!(
                "gold.start {} is after gold.end {}",
                self.gold.start,
                self.gold.end
            );
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be positive");
        }
        Ok(())
    }

    /// Fully qualified `project.dataset.table` id.
    pub fn table_id(&self, table: &str) -> String {
        format!("{}.{}.{}", self.project, self.dataset, table)
    }
}
