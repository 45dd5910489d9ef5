pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod stage;

pub use error::PipelineError;
