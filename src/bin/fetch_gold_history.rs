// src/bin/fetch_gold_history.rs
// NBP gold price history → GCS → BigQuery `gold_history_raw`.

use nbp_ingest::app::{main_for, Pipeline};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    main_for(&[Pipeline::GoldHistory]).await
}
