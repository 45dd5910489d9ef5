// src/bin/fetch_exchange_rates.rs
// Today's NBP exchange-rate table → GCS → BigQuery `fx_today_raw`.

use nbp_ingest::app::{main_for, Pipeline};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    main_for(&[Pipeline::ExchangeRates]).await
}
