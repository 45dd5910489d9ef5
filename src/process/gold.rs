// src/process/gold.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Dataset;

/// One daily gold quote as published by `/cenyzlota`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldQuote {
    pub data: Option<Value>,
    pub cena: Option<Value>,
}

/// Flat row of `gold_history_raw`. Both fields are always present and non-null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldPriceRecord {
    pub effective_date: Value,
    pub price: Value,
}

#[derive(Debug, Clone, Copy)]
pub struct GoldHistory;

impl Dataset for GoldHistory {
    type Response = Vec<GoldQuote>;
    type Record = GoldPriceRecord;

    const LABEL: &'static str = "gold history";

    /// Quotes missing a date or a price are dropped, not null-filled.
    fn flatten(response: Vec<GoldQuote>) -> Vec<GoldPriceRecord> {
        response
            .into_iter()
            .filter_map(|q| match (q.data, q.cena) {
                (Some(effective_date), Some(price)) => Some(GoldPriceRecord {
                    effective_date,
                    price,
                }),
                _ => None,
            })
            .collect()
    }
}
