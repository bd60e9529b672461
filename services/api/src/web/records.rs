//! services/api/src/web/records.rs
//!
//! Handlers for `/api/records` (create, update, fetch, list, stats) and the
//! `/api/health` probe.

use crate::{
    error::ApiError,
    web::{extract::JsonBody, state::AppState},
};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Query, State},
    http::{header::USER_AGENT, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use life_script_core::{
    domain::{Answers, NewRecord, PageRequest, Record, RecordPatch},
    query,
};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Body of `POST /api/records`. Labels computed by the client are optional;
/// blanks are filled from the server-side classification.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRecordRequest {
    pub visitor_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub answers: Option<Answers>,
    pub money_type: Option<String>,
    pub life_type: Option<String>,
    pub personality_type: Option<String>,
    pub summary: Option<String>,
    /// Falls back to the request's `User-Agent` header.
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordResponse {
    pub success: bool,
    pub record_id: String,
    pub record: Record,
}

/// Body of `PUT /api/records`: the record id plus a merge-patch.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(flatten)]
    pub patch: RecordPatch,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordResponse {
    pub success: bool,
    pub record_id: String,
    /// The fields that were actually written.
    pub updates: RecordPatch,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetRecordResponse {
    pub record: Record,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

/// Query string of `GET /api/records`. Numbers arrive as text and fall back
/// to their defaults when they do not parse.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecordsQuery {
    /// `get` fetches one record, `stats` returns counters; anything else lists.
    pub action: Option<String>,
    pub record_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RecordsQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.as_deref().and_then(|v| v.trim().parse().ok()),
            self.limit.as_deref().and_then(|v| v.trim().parse().ok()),
        )
    }
}

//=========================================================================================
// Client Address Extraction
//=========================================================================================

/// Best-effort client IP: first `X-Forwarded-For` entry, else the socket peer.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|first| first.trim().to_string())
            .filter(|first| !first.is_empty());

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();
        Ok(ClientIp(ip))
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a record for a finished quiz.
#[utoipa::path(
    post,
    path = "/api/records",
    request_body = CreateRecordRequest,
    responses(
        (status = 201, description = "Record created", body = CreateRecordResponse),
        (status = 400, description = "Malformed body, or visitorId or answers missing"),
        (status = 500, description = "Record store not configured or unavailable")
    )
)]
pub async fn create_record_handler(
    State(app_state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CreateRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let records = app_state.records()?;

    let visitor_id = body.visitor_id.filter(|v| !v.trim().is_empty());
    let (Some(visitor_id), Some(answers)) = (visitor_id, body.answers) else {
        return Err(ApiError::validation("visitorId and answers are required"));
    };

    let user_agent = body.user_agent.unwrap_or_else(|| {
        headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    });

    let record = records
        .create(NewRecord {
            visitor_id,
            answers,
            money_type: body.money_type.unwrap_or_default(),
            life_type: body.life_type.unwrap_or_default(),
            personality_type: body.personality_type.unwrap_or_default(),
            summary: body.summary.unwrap_or_default(),
            user_agent,
            ip,
        })
        .await?;
    info!("Created record {} for visitor {}.", record.id, record.visitor_id);

    let response = CreateRecordResponse {
        success: true,
        record_id: record.id.clone(),
        record,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update payment status or attach report fields.
#[utoipa::path(
    put,
    path = "/api/records",
    request_body = UpdateRecordRequest,
    responses(
        (status = 200, description = "Fields applied", body = UpdateRecordResponse),
        (status = 400, description = "Malformed body or recordId missing"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Record store not configured or unavailable")
    )
)]
pub async fn update_record_handler(
    State(app_state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<UpdateRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let records = app_state.records()?;

    let Some(record_id) = body.record_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::validation("recordId is required"));
    };

    let mut patch = body.patch;
    if patch.marks_paid() && patch.paid_amount.is_none() {
        patch.paid_amount = Some(app_state.config.paid_amount);
    }

    let updates = records.update(&record_id, patch).await?;
    if updates.marks_paid() {
        info!("Record {} marked as paid.", record_id);
    }

    Ok(Json(UpdateRecordResponse {
        success: true,
        record_id,
        updates,
    }))
}

/// Fetch one record, the statistics snapshot, or a page of records.
#[utoipa::path(
    get,
    path = "/api/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "`{record}` for action=get, a stats snapshot for action=stats, otherwise `{records, pagination}`"),
        (status = 400, description = "action=get without recordId"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Record store not configured or unavailable")
    )
)]
pub async fn get_records_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RecordsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let store = app_state.records()?.store();

    let body = match params.action.as_deref() {
        Some("get") => {
            let Some(record_id) = params.record_id.as_deref().filter(|id| !id.is_empty()) else {
                return Err(ApiError::validation("recordId is required"));
            };
            let record = store.get_record(record_id).await?;
            serde_json::to_value(GetRecordResponse { record })
        }
        Some("stats") => serde_json::to_value(query::stats_snapshot(store.as_ref()).await?),
        _ => serde_json::to_value(query::list_page(store.as_ref(), params.page_request()).await?),
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(body))
}

/// Liveness plus record store reachability.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthResponse),
        (status = 503, description = "Record store is unconfigured or unreachable", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = match app_state.records() {
        Ok(records) => match records.store().ping().await {
            Ok(()) => "up",
            Err(e) => {
                warn!("Record store health check failed: {}", e);
                "down"
            }
        },
        Err(_) => "unconfigured",
    };

    let (status_code, status) = if store == "up" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            store: store.to_string(),
        }),
    )
}
