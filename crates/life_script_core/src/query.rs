//! crates/life_script_core/src/query.rs
//!
//! Read-only projections over the record store for the admin surface.

use crate::domain::{PageRequest, Pagination, RecordPage, StatsSnapshot};
use crate::ports::{PortResult, RecordStore};

/// Paid share of all tests as a percentage with one decimal. Zero tests
/// yields `"0"` rather than a division by zero.
pub fn paid_rate(total_tests: u64, paid_count: u64) -> String {
    if total_tests == 0 {
        return "0".to_string();
    }
    format!("{:.1}", paid_count as f64 / total_tests as f64 * 100.0)
}

pub async fn list_page(store: &dyn RecordStore, request: PageRequest) -> PortResult<RecordPage> {
    let (records, total) = store.list_records(request).await?;
    Ok(RecordPage {
        records,
        pagination: Pagination::new(request, total),
    })
}

pub async fn stats_snapshot(store: &dyn RecordStore) -> PortResult<StatsSnapshot> {
    let counters = store.get_stats().await?;
    Ok(StatsSnapshot {
        paid_rate: paid_rate(counters.total_tests, counters.paid_count),
        total_tests: counters.total_tests,
        paid_count: counters.paid_count,
        today_tests: counters.today_tests,
        today_paid: counters.today_paid,
        type_distribution: counters.type_distribution,
    })
}
