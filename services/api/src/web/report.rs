//! services/api/src/web/report.rs
//!
//! The `/api/ai` handler: opens a report generation and relays it to the
//! client as server-sent events.
//!
//! Each fragment goes out as `data: {"content": "..."}`; a clean end is
//! followed by `data: [DONE]`. A failed or timed-out generation closes the
//! stream without `[DONE]`, but whatever text arrived is still stored on the
//! record.

use crate::{
    error::ApiError,
    web::{extract::JsonBody, state::AppState},
};
use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use life_script_core::{
    classify,
    domain::{Answers, BasicResults},
    ports::{PortError, ReportRequest},
    ReportAccumulator,
};
use serde::Deserialize;
use serde_json::json;
use std::{convert::Infallible, sync::Arc};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

/// Terminal event payload of a clean relay.
pub const DONE: &str = "[DONE]";

/// Body of `POST /api/ai`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateReportRequest {
    #[schema(value_type = Option<Object>)]
    pub answers: Option<Answers>,
    /// Defaults to the server-side classification of `answers`.
    pub basic_results: Option<BasicResults>,
    /// When set, the report is stored on this record once it is paid.
    pub record_id: Option<String>,
}

fn content_event(fragment: &str) -> Event {
    Event::default().data(json!({ "content": fragment }).to_string())
}

/// Stream the AI report for a set of answers.
#[utoipa::path(
    post,
    path = "/api/ai",
    request_body = GenerateReportRequest,
    responses(
        (status = 200, description = "Server-sent events: `{\"content\": ...}` per fragment, then `[DONE]`", body = String, content_type = "text/event-stream"),
        (status = 400, description = "Malformed body or answers missing"),
        (status = 500, description = "AI service not configured or the request failed")
    )
)]
pub async fn generate_report_handler(
    State(app_state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<GenerateReportRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let generator = app_state.report()?.clone();

    let Some(answers) = body.answers else {
        return Err(ApiError::validation("answers is required"));
    };
    let basic = body
        .basic_results
        .unwrap_or_else(|| classify(&answers).basic_results());

    let attach = match body.record_id.filter(|id| !id.trim().is_empty()) {
        Some(record_id) => match app_state.records() {
            Ok(records) => Some((records.clone(), record_id)),
            Err(e) => {
                warn!("Report for {} will not be stored: {}", record_id, e);
                None
            }
        },
        None => None,
    };

    let timeout = app_state.config.report_timeout;
    let deadline = Instant::now() + timeout;
    let request = ReportRequest { answers, basic };
    let mut fragments = timeout_at(deadline, generator.stream_report(&request))
        .await
        .map_err(|_| {
            warn!("Report generation did not start within {:?}.", timeout);
            PortError::Upstream(format!("no response within {:?}", timeout))
        })??;

    let events = stream! {
        let mut report = ReportAccumulator::new();
        let completed = loop {
            match timeout_at(deadline, fragments.next()).await {
                Err(_) => {
                    warn!(
                        "Report stream exceeded {:?} after {} fragments; closing.",
                        timeout,
                        report.fragments()
                    );
                    break false;
                }
                Ok(Some(Err(e))) => {
                    error!("Report stream aborted after {} fragments: {}", report.fragments(), e);
                    break false;
                }
                Ok(Some(Ok(fragment))) => {
                    report.push(&fragment);
                    debug!(
                        "Report fragment {} relayed; {} suggestions parsed so far.",
                        report.fragments(),
                        report.snapshot().suggestions.len()
                    );
                    yield Ok::<_, Infallible>(content_event(&fragment));
                }
                Ok(None) => break true,
            }
        };
        drop(fragments);
        if completed {
            info!("Report stream finished with {} fragments.", report.fragments());
        }

        // Partial reports are attached too; empty ones are not.
        if let Some((records, record_id)) = attach.filter(|_| !report.is_empty()) {
            let parsed = report.finish();
            // Spawned so a client leaving mid-write does not cancel it.
            let task = tokio::spawn(async move {
                records.attach_report(&record_id, &parsed).await
            });
            if let Err(e) = task.await {
                error!("Report attachment task failed: {}", e);
            }
        }

        if completed {
            yield Ok::<_, Infallible>(Event::default().data(DONE));
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
