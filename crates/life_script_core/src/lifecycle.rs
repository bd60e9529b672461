//! crates/life_script_core/src/lifecycle.rs
//!
//! The record state machine: `CREATED → PAID → REPORTED`.
//!
//! The store applies whatever it is given; this controller owns the ordering
//! rules, most importantly that a record is counted as paid at most once.

use std::sync::Arc;
use tracing::{info, warn};

use crate::classify::classify;
use crate::domain::{NewRecord, ParsedReport, Record, RecordPatch, Submission};
use crate::ports::{PortError, PortResult, RecordStore};

#[derive(Clone)]
pub struct RecordLifecycle {
    store: Arc<dyn RecordStore>,
}

impl RecordLifecycle {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Classifies a finished quiz and persists it.
    pub async fn submit(&self, submission: Submission) -> PortResult<Record> {
        let classification = classify(&submission.answers);
        let basic = classification.basic_results();
        self.store
            .create_record(NewRecord {
                visitor_id: submission.visitor_id,
                answers: submission.answers,
                money_type: basic.money_type,
                life_type: basic.life_type,
                personality_type: basic.personality_type,
                summary: basic.summary,
                user_agent: submission.user_agent,
                ip: submission.ip,
            })
            .await
    }

    /// Persists a record whose labels were computed by the client. Any blank
    /// label or summary is filled from the server-side classification.
    pub async fn create(&self, mut record: NewRecord) -> PortResult<Record> {
        let basic = classify(&record.answers).basic_results();
        for (label, computed) in [
            (&mut record.money_type, basic.money_type),
            (&mut record.life_type, basic.life_type),
            (&mut record.personality_type, basic.personality_type),
            (&mut record.summary, basic.summary),
        ] {
            if label.trim().is_empty() {
                *label = computed;
            }
        }
        self.store.create_record(record).await
    }

    /// Applies a patch, dropping any payment change on a record that is
    /// already paid. Unknown ids fail with `NotFound` before anything is written.
    pub async fn update(&self, record_id: &str, mut patch: RecordPatch) -> PortResult<RecordPatch> {
        if patch.paid.is_some() {
            let current = self.store.get_record(record_id).await?;
            if current.paid {
                info!("Record {} is already paid; ignoring payment change.", record_id);
                patch.paid = None;
                patch.paid_amount = None;
            }
        }
        self.store.update_record(record_id, patch).await
    }

    /// `CREATED → PAID`.
    pub async fn mark_paid(&self, record_id: &str, amount: Option<f64>) -> PortResult<RecordPatch> {
        let patch = RecordPatch {
            paid: Some(true),
            paid_amount: amount,
            ..Default::default()
        };
        self.update(record_id, patch).await
    }

    /// `PAID → REPORTED`. Persistence here is best-effort: report generation
    /// may run for a record that was never stored or never paid, so refusals
    /// and failures are logged and reported as `false` rather than returned.
    pub async fn attach_report(&self, record_id: &str, report: &ParsedReport) -> bool {
        match self.store.get_record(record_id).await {
            Ok(record) if record.paid => {}
            Ok(_) => {
                warn!("Cannot attach report: record {} is not paid.", record_id);
                return false;
            }
            Err(PortError::NotFound(_)) => {
                warn!("Cannot attach report: record {} does not exist.", record_id);
                return false;
            }
            Err(e) => {
                warn!("Failed to read record {} before attaching report: {}", record_id, e);
                return false;
            }
        }

        match self
            .store
            .update_record(record_id, RecordPatch::from_report(report))
            .await
        {
            Ok(_) => {
                info!("Attached AI report to record {}.", record_id);
                true
            }
            Err(e) => {
                warn!("Failed to attach report to record {}: {}", record_id, e);
                false
            }
        }
    }
}
