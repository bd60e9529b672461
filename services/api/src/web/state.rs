//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use life_script_core::{
    ports::{PortError, PortResult, ReportGenerationService},
    RecordLifecycle,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Either component may be absent when its backing service is not configured;
/// the server still starts and the affected endpoints answer 500.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub records: Option<RecordLifecycle>,
    pub report: Option<Arc<dyn ReportGenerationService>>,
}

impl AppState {
    pub fn records(&self) -> PortResult<&RecordLifecycle> {
        self.records
            .as_ref()
            .ok_or_else(|| PortError::Configuration("record store is not configured".to_string()))
    }

    pub fn report(&self) -> PortResult<&Arc<dyn ReportGenerationService>> {
        self.report.as_ref().ok_or_else(|| {
            PortError::Configuration("report generation is not configured".to_string())
        })
    }
}
