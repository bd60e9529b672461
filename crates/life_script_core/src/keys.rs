//! crates/life_script_core/src/keys.rs
//!
//! Key layout shared by every record store backend, plus record id and
//! calendar-day key generation.
//!
//! ```text
//! record:{id}                             → hash of record fields
//! records:all                             → sorted set, score = creation ms
//! visitor:{visitor_id}:records            → set of record ids
//! stats:total_tests                       → counter
//! stats:paid_count                        → counter
//! stats:daily:{YYYYMMDD}:tests            → counter
//! stats:daily:{YYYYMMDD}:paid             → counter
//! stats:type_distribution:{dimension}     → hash label → count
//! ```

use chrono::{DateTime, Local, TimeZone, Utc};
use rand::Rng;

pub const RECORD_INDEX: &str = "records:all";
pub const TOTAL_TESTS: &str = "stats:total_tests";
pub const PAID_COUNT: &str = "stats:paid_count";

pub const RECORD_ID_PREFIX: &str = "REC";
const ID_SUFFIX_LEN: usize = 3;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The three histogram dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Money,
    Life,
    Personality,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Money => "money",
            Dimension::Life => "life",
            Dimension::Personality => "personality",
        }
    }

    pub fn distribution_key(&self) -> String {
        format!("stats:type_distribution:{}", self.as_str())
    }
}

pub fn record_key(record_id: &str) -> String {
    format!("record:{}", record_id)
}

pub fn visitor_key(visitor_id: &str) -> String {
    format!("visitor:{}:records", visitor_id)
}

pub fn daily_tests_key(day: &str) -> String {
    format!("stats:daily:{}:tests", day)
}

pub fn daily_paid_key(day: &str) -> String {
    format!("stats:daily:{}:paid", day)
}

/// Calendar-day key in the server's local time zone.
pub fn day_key<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d").to_string()
}

/// Today's day key, taken at processing time rather than from any record.
pub fn today_key() -> String {
    day_key(&Local::now())
}

/// `REC` + `YYYYMMDDHHMMSS` (UTC) + three random base-36 characters.
pub fn new_record_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}{}", RECORD_ID_PREFIX, now.format("%Y%m%d%H%M%S"), suffix)
}
