//! services/api/src/adapters/redis_store.rs
//!
//! This module contains the Redis adapter, which is the production implementation
//! of the `RecordStore` port from the `core` crate. Each step is a single-key
//! Redis command; an operation is a sequence of them, not a transaction.

use async_trait::async_trait;
use chrono::Utc;
use life_script_core::{
    codec,
    domain::{NewRecord, PageRequest, Record, RecordPatch, StatsCounters, TypeDistribution},
    keys::{self, Dimension},
    ports::{PortError, PortResult, RecordStore},
};
use redis::{aio::MultiplexedConnection, AsyncCommands};
use std::collections::{BTreeMap, HashMap};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A record store adapter backed by Redis.
#[derive(Clone)]
pub struct RedisRecordStore {
    client: redis::Client,
}

impl RedisRecordStore {
    /// Creates a new `RedisRecordStore`.
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> PortResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_error)
    }
}

fn store_error(e: redis::RedisError) -> PortError {
    PortError::Unexpected(e.to_string())
}

async fn distribution(
    conn: &mut MultiplexedConnection,
    dimension: Dimension,
) -> PortResult<BTreeMap<String, u64>> {
    conn.hgetall(dimension.distribution_key())
        .await
        .map_err(store_error)
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn ping(&self) -> PortResult<()> {
        let mut conn = self.connection().await?;
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(PortError::Unexpected(format!("unexpected PING reply {}", reply)))
        }
    }

    async fn create_record(&self, new: NewRecord) -> PortResult<Record> {
        if new.visitor_id.trim().is_empty() {
            return Err(PortError::Validation("visitorId is required".to_string()));
        }
        let mut conn = self.connection().await?;

        let now = Utc::now();
        let record = codec::record_from_new(keys::new_record_id(now), new, now);
        let fields = codec::encode_new(&record)?;
        let today = keys::today_key();

        let _: () = conn
            .hset_multiple(keys::record_key(&record.id), &fields)
            .await
            .map_err(store_error)?;
        let _: () = conn
            .zadd(keys::RECORD_INDEX, &record.id, now.timestamp_millis())
            .await
            .map_err(store_error)?;
        let _: () = conn
            .sadd(keys::visitor_key(&record.visitor_id), &record.id)
            .await
            .map_err(store_error)?;
        let _: () = conn
            .incr(keys::TOTAL_TESTS, 1)
            .await
            .map_err(store_error)?;
        let _: () = conn
            .incr(keys::daily_tests_key(&today), 1)
            .await
            .map_err(store_error)?;

        for (dimension, label) in [
            (Dimension::Money, &record.money_type),
            (Dimension::Life, &record.life_type),
            (Dimension::Personality, &record.personality_type),
        ] {
            if !label.is_empty() {
                let _: () = conn
                    .hincr(dimension.distribution_key(), label, 1)
                    .await
                    .map_err(store_error)?;
            }
        }

        Ok(record)
    }

    async fn update_record(&self, record_id: &str, patch: RecordPatch) -> PortResult<RecordPatch> {
        let mut conn = self.connection().await?;
        let key = keys::record_key(record_id);

        let exists: bool = conn.exists(&key).await.map_err(store_error)?;
        if !exists {
            return Err(PortError::NotFound(format!("Record {} not found", record_id)));
        }

        let patch = codec::prepare_patch(patch, Utc::now());
        if patch.marks_paid() {
            let today = keys::today_key();
            let _: () = conn
                .incr(keys::PAID_COUNT, 1)
                .await
                .map_err(store_error)?;
            let _: () = conn
                .incr(keys::daily_paid_key(&today), 1)
                .await
                .map_err(store_error)?;
        }

        let fields = codec::encode_patch(&patch)?;
        if !fields.is_empty() {
            let _: () = conn
                .hset_multiple(&key, &fields)
                .await
                .map_err(store_error)?;
        }

        Ok(patch)
    }

    async fn get_record(&self, record_id: &str) -> PortResult<Record> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(keys::record_key(record_id))
            .await
            .map_err(store_error)?;
        codec::decode_record(fields)
            .ok_or_else(|| PortError::NotFound(format!("Record {} not found", record_id)))
    }

    async fn list_records(&self, page: PageRequest) -> PortResult<(Vec<Record>, u64)> {
        let mut conn = self.connection().await?;
        let start = page.offset() as isize;
        let stop = start + page.limit as isize - 1;

        let ids: Vec<String> = conn
            .zrevrange(keys::RECORD_INDEX, start, stop)
            .await
            .map_err(store_error)?;
        let total: u64 = conn.zcard(keys::RECORD_INDEX).await.map_err(store_error)?;

        let lookups = ids.iter().map(|id| {
            let mut conn = conn.clone();
            let key = keys::record_key(id);
            async move { conn.hgetall::<_, HashMap<String, String>>(key).await }
        });
        let mut records = Vec::with_capacity(ids.len());
        for fields in futures::future::join_all(lookups).await {
            if let Some(record) = codec::decode_record(fields.map_err(store_error)?) {
                records.push(record);
            }
        }

        Ok((records, total))
    }

    async fn get_stats(&self) -> PortResult<StatsCounters> {
        let mut conn = self.connection().await?;
        let today = keys::today_key();

        let total_tests: Option<u64> = conn.get(keys::TOTAL_TESTS).await.map_err(store_error)?;
        let paid_count: Option<u64> = conn.get(keys::PAID_COUNT).await.map_err(store_error)?;
        let today_tests: Option<u64> = conn
            .get(keys::daily_tests_key(&today))
            .await
            .map_err(store_error)?;
        let today_paid: Option<u64> = conn
            .get(keys::daily_paid_key(&today))
            .await
            .map_err(store_error)?;

        Ok(StatsCounters {
            total_tests: total_tests.unwrap_or(0),
            paid_count: paid_count.unwrap_or(0),
            today_tests: today_tests.unwrap_or(0),
            today_paid: today_paid.unwrap_or(0),
            type_distribution: TypeDistribution {
                money: distribution(&mut conn, Dimension::Money).await?,
                life: distribution(&mut conn, Dimension::Life).await?,
                personality: distribution(&mut conn, Dimension::Personality).await?,
            },
        })
    }
}
