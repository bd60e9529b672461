//! crates/life_script_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any store or transport; the wire shape
//! (camelCase JSON) is the only serialization concern expressed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//=========================================================================================
// Quiz Answers
//=========================================================================================

/// One of the four options offered by every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Choice {
    A,
    B,
    C,
    D,
}

/// Question number (1-based) to the selected option.
pub type Answers = BTreeMap<u32, Choice>;

//=========================================================================================
// Classification Labels
//=========================================================================================

/// How the user approaches earning and spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyType {
    Growth,
    Enjoyment,
    Stable,
}

impl MoneyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoneyType::Growth => "growth",
            MoneyType::Enjoyment => "enjoyment",
            MoneyType::Stable => "stable",
        }
    }
}

/// How the user balances work and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeType {
    Relaxed,
    Balanced,
    Social,
}

impl LifeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeType::Relaxed => "relaxed",
            LifeType::Balanced => "balanced",
            LifeType::Social => "social",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalityType {
    Decisive,
    Cautious,
    Hesitant,
}

impl PersonalityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Decisive => "decisive",
            PersonalityType::Cautious => "cautious",
            PersonalityType::Hesitant => "hesitant",
        }
    }
}

/// The three deterministic labels computed from a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub money: MoneyType,
    pub life: LifeType,
    pub personality: PersonalityType,
}

impl Classification {
    /// The one-line summary stored alongside the record (second person).
    pub fn summary(&self) -> String {
        format!(
            "Your core life logic: {} with money, {} in life, {} by nature. Precise effort, zero inner drain.",
            self.money.as_str(),
            self.life.as_str(),
            self.personality.as_str()
        )
    }

    /// The first-person variant shown on share cards.
    pub fn share_summary(&self) -> String {
        format!(
            "My core life logic: {} with money, {} in life, {} by nature. Precise effort, zero inner drain.",
            self.money.as_str(),
            self.life.as_str(),
            self.personality.as_str()
        )
    }

    pub fn basic_results(&self) -> BasicResults {
        BasicResults {
            money_type: self.money.as_str().to_string(),
            life_type: self.life.as_str().to_string(),
            personality_type: self.personality.as_str().to_string(),
            summary: self.summary(),
        }
    }
}

/// Classification labels as exchanged with clients. Any field may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct BasicResults {
    pub money_type: String,
    pub life_type: String,
    pub personality_type: String,
    pub summary: String,
}

//=========================================================================================
// AI Report
//=========================================================================================

/// Short promotional text in three tones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ShareCopy {
    pub meme: String,
    pub literary: String,
    pub simple: String,
}

/// The structured result extracted from the generated report text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReport {
    pub narrative: String,
    pub suggestions: Vec<String>,
    pub tips: Vec<String>,
    pub warnings: Vec<String>,
    pub share_copy: ShareCopy,
}

//=========================================================================================
// Records
//=========================================================================================

/// A stored sub-field that is normally JSON. Reads never fail on it: when the
/// stored text does not decode, the raw string is surfaced instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Parsed(T),
    Raw(String),
}

impl<T> Lenient<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Lenient::Parsed(value) => Some(value),
            Lenient::Raw(_) => None,
        }
    }
}

/// One persisted quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub visitor_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub answers: Lenient<Answers>,
    pub money_type: String,
    pub life_type: String,
    pub personality_type: String,
    pub summary: String,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub suggestions: Option<Lenient<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub tips: Option<Lenient<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub warnings: Option<Lenient<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<ShareCopy>))]
    pub share_copy: Option<Lenient<ShareCopy>>,
    pub created_at: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
}

/// Everything needed to create a record. Labels may be blank.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub visitor_id: String,
    pub answers: Answers,
    pub money_type: String,
    pub life_type: String,
    pub personality_type: String,
    pub summary: String,
    pub user_agent: String,
    pub ip: String,
}

/// A finished quiz before classification.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub visitor_id: String,
    pub answers: Answers,
    pub user_agent: String,
    pub ip: String,
}

/// A merge-patch over the mutable record fields. `None` means "leave alone".
///
/// `paid_at` is never accepted from callers; the store stamps it when a
/// payment is applied and reports it back in the applied patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_copy: Option<ShareCopy>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    /// True when applying this patch is a payment transition.
    pub fn marks_paid(&self) -> bool {
        self.paid == Some(true)
    }

    /// The patch that merges a parsed report into a record.
    pub fn from_report(report: &ParsedReport) -> Self {
        Self {
            ai_report: Some(report.narrative.clone()),
            suggestions: Some(report.suggestions.clone()),
            tips: Some(report.tips.clone()),
            warnings: Some(report.warnings.clone()),
            share_copy: Some(report.share_copy.clone()),
            ..Default::default()
        }
    }
}

//=========================================================================================
// Listing and Statistics
//=========================================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub pagination: Pagination,
}

/// Label to occurrence count, per classification dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TypeDistribution {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub money: BTreeMap<String, u64>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub life: BTreeMap<String, u64>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub personality: BTreeMap<String, u64>,
}

/// Raw counter values as read from the store. Absent counters are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsCounters {
    pub total_tests: u64,
    pub paid_count: u64,
    pub today_tests: u64,
    pub today_paid: u64,
    pub type_distribution: TypeDistribution,
}

/// The statistics view served to the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_tests: u64,
    pub paid_count: u64,
    pub paid_rate: String,
    pub today_tests: u64,
    pub today_paid: u64,
    pub type_distribution: TypeDistribution,
}
