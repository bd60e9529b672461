//! services/api/src/adapters/memory_store.rs
//!
//! A process-local `RecordStore`. It mirrors the Redis layout (a hash per
//! record, a time-ordered index, per-visitor sets, plain counters) so the two
//! backends behave the same from the outside. Used for local runs without
//! Redis and by the HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use life_script_core::{
    codec,
    domain::{NewRecord, PageRequest, Record, RecordPatch, StatsCounters, TypeDistribution},
    keys::{self, Dimension},
    ports::{PortError, PortResult, RecordStore},
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    records: HashMap<String, HashMap<String, String>>,
    /// `(score, id)` pairs kept sorted newest first.
    index: Vec<(i64, String)>,
    visitors: HashMap<String, HashSet<String>>,
    counters: HashMap<String, u64>,
    distributions: HashMap<String, BTreeMap<String, u64>>,
}

impl State {
    fn incr(&mut self, key: String) {
        *self.counters.entry(key).or_insert(0) += 1;
    }

    fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    fn distribution(&self, dimension: Dimension) -> BTreeMap<String, u64> {
        self.distributions
            .get(&dimension.distribution_key())
            .cloned()
            .unwrap_or_default()
    }
}

/// An in-memory record store. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a record's hash but leaves its index entry behind, the same
    /// state an expired Redis hash produces.
    pub async fn delete_record(&self, record_id: &str) -> bool {
        let mut state = self.state.lock().await;
        state.records.remove(&keys::record_key(record_id)).is_some()
    }

    /// Ids of the records a visitor has created.
    pub async fn visitor_records(&self, visitor_id: &str) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state
            .visitors
            .get(&keys::visitor_key(visitor_id))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn ping(&self) -> PortResult<()> {
        Ok(())
    }

    async fn create_record(&self, new: NewRecord) -> PortResult<Record> {
        if new.visitor_id.trim().is_empty() {
            return Err(PortError::Validation("visitorId is required".to_string()));
        }

        let now = Utc::now();
        let record = codec::record_from_new(keys::new_record_id(now), new, now);
        let fields = codec::encode_new(&record)?;
        let today = keys::today_key();

        let mut state = self.state.lock().await;
        state.records.insert(
            keys::record_key(&record.id),
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        );

        let entry = (now.timestamp_millis(), record.id.clone());
        let position = state
            .index
            .iter()
            .position(|existing| *existing < entry)
            .unwrap_or(state.index.len());
        state.index.insert(position, entry);

        state
            .visitors
            .entry(keys::visitor_key(&record.visitor_id))
            .or_default()
            .insert(record.id.clone());
        state.incr(keys::TOTAL_TESTS.to_string());
        state.incr(keys::daily_tests_key(&today));

        for (dimension, label) in [
            (Dimension::Money, &record.money_type),
            (Dimension::Life, &record.life_type),
            (Dimension::Personality, &record.personality_type),
        ] {
            if !label.is_empty() {
                *state
                    .distributions
                    .entry(dimension.distribution_key())
                    .or_default()
                    .entry(label.clone())
                    .or_insert(0) += 1;
            }
        }

        Ok(record)
    }

    async fn update_record(&self, record_id: &str, patch: RecordPatch) -> PortResult<RecordPatch> {
        let key = keys::record_key(record_id);
        let mut state = self.state.lock().await;
        if !state.records.contains_key(&key) {
            return Err(PortError::NotFound(format!("Record {} not found", record_id)));
        }

        let patch = codec::prepare_patch(patch, Utc::now());
        let fields = codec::encode_patch(&patch)?;

        if patch.marks_paid() {
            let today = keys::today_key();
            state.incr(keys::PAID_COUNT.to_string());
            state.incr(keys::daily_paid_key(&today));
        }
        if let Some(hash) = state.records.get_mut(&key) {
            for (name, value) in fields {
                hash.insert(name.to_string(), value);
            }
        }

        Ok(patch)
    }

    async fn get_record(&self, record_id: &str) -> PortResult<Record> {
        let state = self.state.lock().await;
        state
            .records
            .get(&keys::record_key(record_id))
            .cloned()
            .and_then(codec::decode_record)
            .ok_or_else(|| PortError::NotFound(format!("Record {} not found", record_id)))
    }

    async fn list_records(&self, page: PageRequest) -> PortResult<(Vec<Record>, u64)> {
        let state = self.state.lock().await;
        let records = state
            .index
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .filter_map(|(_, id)| state.records.get(&keys::record_key(id)).cloned())
            .filter_map(codec::decode_record)
            .collect();
        Ok((records, state.index.len() as u64))
    }

    async fn get_stats(&self) -> PortResult<StatsCounters> {
        let state = self.state.lock().await;
        let today = keys::today_key();
        Ok(StatsCounters {
            total_tests: state.counter(keys::TOTAL_TESTS),
            paid_count: state.counter(keys::PAID_COUNT),
            today_tests: state.counter(&keys::daily_tests_key(&today)),
            today_paid: state.counter(&keys::daily_paid_key(&today)),
            type_distribution: TypeDistribution {
                money: state.distribution(Dimension::Money),
                life: state.distribution(Dimension::Life),
                personality: state.distribution(Dimension::Personality),
            },
        })
    }
}
