use nbp_ingest::app::{main_for, Pipeline};
use std::process::ExitCode;

/// Runs both pipelines one after the other; they share nothing but the config.
#[tokio::main]
async fn main() -> ExitCode {
    main_for(&[Pipeline::ExchangeRates, Pipeline::GoldHistory]).await
}
