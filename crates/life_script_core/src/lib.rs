pub mod classify;
pub mod codec;
pub mod domain;
pub mod keys;
pub mod lifecycle;
pub mod ports;
pub mod query;
pub mod report_parser;

pub use classify::classify;
pub use domain::{
    Answers, BasicResults, Choice, Classification, Lenient, NewRecord, PageRequest, Pagination,
    ParsedReport, Record, RecordPage, RecordPatch, ShareCopy, StatsCounters, StatsSnapshot,
    Submission, TypeDistribution,
};
pub use lifecycle::RecordLifecycle;
pub use ports::{
    PortError, PortResult, RecordStore, ReportGenerationService, ReportRequest, ReportStream,
};
pub use report_parser::{parse_report, strip_markup, ReportAccumulator};
