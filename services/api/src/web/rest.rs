//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification of the REST API.

use crate::web::{records, report};
use life_script_core::domain::{
    BasicResults, Choice, Pagination, Record, RecordPage, RecordPatch, ShareCopy, StatsSnapshot,
    TypeDistribution,
};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        records::create_record_handler,
        records::update_record_handler,
        records::get_records_handler,
        records::health_handler,
        report::generate_report_handler,
    ),
    components(
        schemas(
            records::CreateRecordRequest,
            records::CreateRecordResponse,
            records::UpdateRecordRequest,
            records::UpdateRecordResponse,
            records::GetRecordResponse,
            records::HealthResponse,
            report::GenerateReportRequest,
            Record,
            RecordPatch,
            RecordPage,
            Pagination,
            StatsSnapshot,
            TypeDistribution,
            BasicResults,
            ShareCopy,
            Choice,
        )
    ),
    tags(
        (name = "Life Script API", description = "Quiz records, statistics and streamed AI reports.")
    )
)]
pub struct ApiDoc;
