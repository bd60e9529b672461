//! crates/life_script_core/src/codec.rs
//!
//! Conversion between `Record` and the flat string-field hash a store keeps
//! per record. Structured sub-fields are JSON strings inside the hash.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::{Lenient, NewRecord, Record, RecordPatch};
use crate::ports::{PortError, PortResult};

pub const ID: &str = "id";
pub const VISITOR_ID: &str = "visitorId";
pub const ANSWERS: &str = "answers";
pub const MONEY_TYPE: &str = "moneyType";
pub const LIFE_TYPE: &str = "lifeType";
pub const PERSONALITY_TYPE: &str = "personalityType";
pub const SUMMARY: &str = "summary";
pub const PAID: &str = "paid";
pub const PAID_AT: &str = "paidAt";
pub const PAID_AMOUNT: &str = "paidAmount";
pub const AI_REPORT: &str = "aiReport";
pub const SUGGESTIONS: &str = "suggestions";
pub const TIPS: &str = "tips";
pub const WARNINGS: &str = "warnings";
pub const SHARE_COPY: &str = "shareCopy";
pub const CREATED_AT: &str = "createdAt";
pub const USER_AGENT: &str = "userAgent";
pub const IP: &str = "ip";

/// Hash fields as (name, value) pairs, ready for a multi-field set.
pub type Fields = Vec<(&'static str, String)>;

fn to_json<T: Serialize>(value: &T) -> PortResult<String> {
    serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

fn lenient<T: DeserializeOwned>(raw: String) -> Lenient<T> {
    match serde_json::from_str(&raw) {
        Ok(value) => Lenient::Parsed(value),
        Err(_) => Lenient::Raw(raw),
    }
}

fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Builds the in-memory view of a freshly created record.
pub fn record_from_new(id: String, new: NewRecord, created_at: DateTime<Utc>) -> Record {
    Record {
        id,
        visitor_id: new.visitor_id,
        answers: Lenient::Parsed(new.answers),
        money_type: new.money_type,
        life_type: new.life_type,
        personality_type: new.personality_type,
        summary: new.summary,
        paid: false,
        paid_at: None,
        paid_amount: None,
        ai_report: None,
        suggestions: None,
        tips: None,
        warnings: None,
        share_copy: None,
        created_at,
        user_agent: new.user_agent,
        ip: new.ip,
    }
}

/// The fields written when a record is created.
pub fn encode_new(record: &Record) -> PortResult<Fields> {
    let answers = match &record.answers {
        Lenient::Parsed(answers) => to_json(answers)?,
        Lenient::Raw(raw) => raw.clone(),
    };
    Ok(vec![
        (ID, record.id.clone()),
        (VISITOR_ID, record.visitor_id.clone()),
        (ANSWERS, answers),
        (MONEY_TYPE, record.money_type.clone()),
        (LIFE_TYPE, record.life_type.clone()),
        (PERSONALITY_TYPE, record.personality_type.clone()),
        (SUMMARY, record.summary.clone()),
        (PAID, record.paid.to_string()),
        (CREATED_AT, record.created_at.to_rfc3339()),
        (USER_AGENT, record.user_agent.clone()),
        (IP, record.ip.clone()),
    ])
}

/// Settles a patch right before it is written: a payment gets its timestamp,
/// and an amount is only kept alongside a payment.
pub fn prepare_patch(mut patch: RecordPatch, now: DateTime<Utc>) -> RecordPatch {
    if patch.marks_paid() {
        patch.paid_at = Some(now);
    } else {
        patch.paid_at = None;
        patch.paid_amount = None;
    }
    patch
}

/// The fields written for a patch. Only `Some` values produce a field.
pub fn encode_patch(patch: &RecordPatch) -> PortResult<Fields> {
    let mut fields = Fields::new();
    if let Some(paid) = patch.paid {
        fields.push((PAID, paid.to_string()));
    }
    if let Some(paid_at) = patch.paid_at {
        fields.push((PAID_AT, paid_at.to_rfc3339()));
    }
    if let Some(amount) = patch.paid_amount {
        fields.push((PAID_AMOUNT, amount.to_string()));
    }
    if let Some(report) = &patch.ai_report {
        fields.push((AI_REPORT, report.clone()));
    }
    if let Some(suggestions) = &patch.suggestions {
        fields.push((SUGGESTIONS, to_json(suggestions)?));
    }
    if let Some(tips) = &patch.tips {
        fields.push((TIPS, to_json(tips)?));
    }
    if let Some(warnings) = &patch.warnings {
        fields.push((WARNINGS, to_json(warnings)?));
    }
    if let Some(share_copy) = &patch.share_copy {
        fields.push((SHARE_COPY, to_json(share_copy)?));
    }
    Ok(fields)
}

/// Rebuilds a record from its hash. An empty hash means the record does not
/// exist. Decoding is lenient: nothing in the hash can make this fail.
pub fn decode_record(mut fields: HashMap<String, String>) -> Option<Record> {
    if fields.is_empty() {
        return None;
    }
    let mut take = |name: &str| fields.remove(name);

    let id = take(ID).unwrap_or_default();
    let created_at = match take(CREATED_AT).as_deref().and_then(timestamp) {
        Some(at) => at,
        None => {
            warn!("Record {} has no readable creation time.", id);
            DateTime::<Utc>::default()
        }
    };

    Some(Record {
        visitor_id: take(VISITOR_ID).unwrap_or_default(),
        answers: take(ANSWERS).map(lenient).unwrap_or(Lenient::Raw(String::new())),
        money_type: take(MONEY_TYPE).unwrap_or_default(),
        life_type: take(LIFE_TYPE).unwrap_or_default(),
        personality_type: take(PERSONALITY_TYPE).unwrap_or_default(),
        summary: take(SUMMARY).unwrap_or_default(),
        paid: matches!(take(PAID).as_deref(), Some("true") | Some("1")),
        paid_at: take(PAID_AT).as_deref().and_then(timestamp),
        paid_amount: take(PAID_AMOUNT).and_then(|raw| raw.parse().ok()),
        ai_report: take(AI_REPORT),
        suggestions: take(SUGGESTIONS).map(lenient),
        tips: take(TIPS).map(lenient),
        warnings: take(WARNINGS).map(lenient),
        share_copy: take(SHARE_COPY).map(lenient),
        user_agent: take(USER_AGENT).unwrap_or_default(),
        ip: take(IP).unwrap_or_default(),
        created_at,
        id,
    })
}
