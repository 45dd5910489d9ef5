// src/process/exchange_rates.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Dataset;

/// One published table (`A` or `B`) for one effective date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub table: Option<Value>,
    pub effective_date: Option<Value>,
    #[serde(default)]
    pub rates: Vec<Rate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rate {
    pub currency: Option<Value>,
    pub code: Option<Value>,
    pub mid: Option<Value>,
}

/// Flat row of `fx_today_raw`. Values pass through as received; typing is left to the load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRateRecord {
    pub table_type: Option<Value>,
    pub effective_date: Option<Value>,
    pub currency: Option<Value>,
    pub code: Option<Value>,
    pub mid: Option<Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExchangeRates;

impl Dataset for ExchangeRates {
    type Response = Vec<RateTable>;
    type Record = ExchangeRateRecord;

    const LABEL: &'static str = "exchange rates";

    /// One record per (table, rate) pair; missing fields stay null.
    fn flatten(response: Vec<RateTable>) -> Vec<ExchangeRateRecord> {
        response
            .into_iter()
            .flat_map(|day| {
                let RateTable {
                    table,
                    effective_date,
                    rates,
                } = day;
                rates.into_iter().map(move |rate| ExchangeRateRecord {
                    table_type: table.clone(),
                    effective_date: effective_date.clone(),
                    currency: rate.currency,
                    code: rate.code,
                    mid: rate.mid,
                })
            })
            .collect()
    }
}
