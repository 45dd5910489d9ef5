// src/pipeline/jobs.rs

use anyhow::Result;
use chrono::{Local, NaiveDate};

use super::PipelineJob;
use crate::{
    config::IngestConfig,
    fetch::urls::{exchange_rates_url, gold_history_url},
    load::{Column, ColumnType, LoadRequest, TableRef},
    process::{exchange_rates::ExchangeRates, gold::GoldHistory},
};

const EFFECTIVE_DATE: &str = "effective_date";

/// Today's table of mid rates, clustered by currency code.
pub fn exchange_rates_job(cfg: &IngestConfig) -> Result<PipelineJob<ExchangeRates>> {
    let url = exchange_rates_url(&cfg.api_base, &cfg.exchange_rates.table_type)?;
    Ok(PipelineJob::new(
        url,
        cfg.exchange_rates.object_prefix.clone(),
        LoadRequest {
            table: table_ref(cfg, &cfg.exchange_rates.table),
            schema: vec![
                Column::new("table_type", ColumnType::String),
                Column::new(EFFECTIVE_DATE, ColumnType::Date),
                Column::new("currency", ColumnType::String),
                Column::new("code", ColumnType::String),
                Column::new("mid", ColumnType::Numeric),
            ],
            partition_field: EFFECTIVE_DATE,
            clustering: vec!["code"],
        },
    ))
}

/// Gold prices over the configured inclusive date range.
pub fn gold_history_job(cfg: &IngestConfig) -> Result<PipelineJob<GoldHistory>> {
    let url = gold_history_url(&cfg.api_base, cfg.gold.start, cfg.gold.end)?;
    Ok(PipelineJob::new(
        url,
        cfg.gold.object_prefix.clone(),
        LoadRequest {
            table: table_ref(cfg, &cfg.gold.table),
            schema: vec![
                Column::new(EFFECTIVE_DATE, ColumnType::Date),
                Column::new("price", ColumnType::Numeric),
            ],
            partition_field: EFFECTIVE_DATE,
            clustering: vec![],
        },
    ))
}

/// Current local date, used to name the staged object.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn table_ref(cfg: &IngestConfig, table: &str) -> TableRef {
    TableRef {
        project: cfg.project.clone(),
        dataset: cfg.dataset.clone(),
        table: table.to_string(),
    }
}
