// src/load/mod.rs

use async_trait::async_trait;
use std::fmt;

use crate::{error::PipelineError, stage::StagedObject};

pub mod bigquery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Date,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// A truncate-and-replace NDJSON load into a day-partitioned table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub table: TableRef,
    pub schema: Vec<Column>,
    pub partition_field: &'static str,
    /// Empty means no clustering.
    pub clustering: Vec<&'static str>,
}

/// Runs a load job from a staged object and waits for it to finish.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, source: &StagedObject, request: &LoadRequest) -> Result<(), PipelineError>;
}
