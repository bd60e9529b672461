//! crates/life_script_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete record store and language-model backend.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::domain::{
    Answers, BasicResults, NewRecord, PageRequest, Record, RecordPatch, StatsCounters,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (store, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Required input is missing or malformed. Correctable by the caller.
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A credential or backend setting is missing. Fixable only by an operator.
    #[error("Not configured: {0}")]
    Configuration(String),
    /// The language-model backend rejected or failed the request.
    #[error("Upstream failure: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for records plus the aggregate counters derived from them.
///
/// Every step inside an operation is an independent single-key atomic
/// operation; nothing spans keys transactionally.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verifies the backend is reachable.
    async fn ping(&self) -> PortResult<()>;

    /// Persists a new record and bumps the creation counters and histograms.
    async fn create_record(&self, record: NewRecord) -> PortResult<Record>;

    /// Applies a merge-patch and returns the fields actually written.
    ///
    /// Every call carrying `paid == Some(true)` increments the paid counters;
    /// guarding against repeats is the caller's job.
    async fn update_record(&self, record_id: &str, patch: RecordPatch) -> PortResult<RecordPatch>;

    async fn get_record(&self, record_id: &str) -> PortResult<Record>;

    /// Newest first. Ids whose record no longer exists are skipped, so a page
    /// may be short. Returns the page and the size of the global index.
    async fn list_records(&self, page: PageRequest) -> PortResult<(Vec<Record>, u64)>;

    async fn get_stats(&self) -> PortResult<StatsCounters>;
}

/// Input to a report generation.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub answers: Answers,
    pub basic: BasicResults,
}

/// Ordered text fragments of a generated report.
pub type ReportStream = Pin<Box<dyn Stream<Item = PortResult<String>> + Send>>;

#[async_trait]
pub trait ReportGenerationService: Send + Sync {
    /// Opens a streamed generation. Fails with `Upstream` when the backend
    /// refuses the request before producing anything.
    async fn stream_report(&self, request: &ReportRequest) -> PortResult<ReportStream>;
}
