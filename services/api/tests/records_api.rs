//! Integration tests for the `/api/records` and `/api/health` endpoints,
//! driven through the full router against the in-memory store.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::*;
use serde_json::json;

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_returns_201_and_fills_blank_labels() {
    let app = records_app();
    let body = json!({
        "visitorId": "V1",
        "answers": uniform_answers("A"),
        "moneyType": "",
        "lifeType": "balanced",
    });

    let response = send(&app, json_request("POST", "/api/records", &body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let record_id = json["recordId"].as_str().unwrap();
    assert!(record_id.starts_with("REC"));
    assert_eq!(json["record"]["id"], record_id);
    assert_eq!(json["record"]["moneyType"], "growth");
    assert_eq!(json["record"]["lifeType"], "balanced");
    assert_eq!(json["record"]["personalityType"], "decisive");
    assert_eq!(json["record"]["paid"], false);
    assert_eq!(json["record"]["answers"]["1"], "A");
    assert!(json["record"]["summary"]
        .as_str()
        .unwrap()
        .contains("growth with money"));
}

#[tokio::test]
async fn create_records_client_address_and_agent() {
    let app = records_app();
    let body = json!({ "visitorId": "V1", "answers": uniform_answers("B") });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/records")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "quiz-browser/1.0")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(body.to_string()))
        .unwrap();

    let json = body_json(send(&app, request).await).await;
    assert_eq!(json["record"]["ip"], "203.0.113.7");
    assert_eq!(json["record"]["userAgent"], "quiz-browser/1.0");
    assert_eq!(app.store.visitor_records("V1").await.len(), 1);
}

#[tokio::test]
async fn create_without_answers_is_400() {
    let app = records_app();
    for body in [json!({ "visitorId": "V1" }), json!({ "answers": uniform_answers("A") })] {
        let response = send(&app, json_request("POST", "/api/records", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "visitorId and answers are required");
    }

    let stats = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(stats["totalTests"], 0);
}

#[tokio::test]
async fn malformed_body_is_400_with_json_error() {
    let app = records_app();
    let bad_choice = json!({ "visitorId": "V1", "answers": { "1": "E" } });
    let response = send(&app, json_request("POST", "/api/records", &bad_choice)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid request body"), "{}", error);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/records")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"recordId\": "))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    let stats = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(stats["totalTests"], 0);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_without_record_id_is_400() {
    let app = records_app();
    let response = send(&app, json_request("PUT", "/api/records", &json!({ "paid": true }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_record_is_404_without_side_effects() {
    let app = records_app();
    let body = json!({ "recordId": "REC00000000000000XYZ", "paid": true });
    let response = send(&app, json_request("PUT", "/api/records", &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Record not found");

    let stats = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(stats["paidCount"], 0);
}

#[tokio::test]
async fn payment_is_counted_once() {
    let app = records_app();
    let record_id = create_record(&app, "V1", "A").await;
    let body = json!({ "recordId": record_id, "paid": true });

    let first = body_json(send(&app, json_request("PUT", "/api/records", &body)).await).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["recordId"], record_id.as_str());
    assert_eq!(first["updates"]["paid"], true);
    assert_eq!(first["updates"]["paidAmount"], 3.9);
    assert!(first["updates"]["paidAt"].is_string());

    let second = send(&app, json_request("PUT", "/api/records", &body)).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = body_json(second).await;
    assert!(second["updates"].get("paid").is_none());

    let stats = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(stats["paidCount"], 1);
    assert_eq!(stats["todayPaid"], 1);
    assert_eq!(stats["paidRate"], "100.0");
}

#[tokio::test]
async fn update_merges_report_fields() {
    let app = records_app();
    let record_id = create_record(&app, "V1", "A").await;
    let body = json!({
        "recordId": record_id,
        "aiReport": "You plan ahead.",
        "suggestions": ["Save", "Invest"],
        "shareCopy": { "meme": "m", "literary": "l", "simple": "s" },
    });
    let response = send(&app, json_request("PUT", "/api/records", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/records?action=get&recordId={}", record_id);
    let json = body_json(send(&app, get_request(&uri)).await).await;
    let record = &json["record"];
    assert_eq!(record["aiReport"], "You plan ahead.");
    assert_eq!(record["suggestions"], json!(["Save", "Invest"]));
    assert_eq!(record["shareCopy"]["simple"], "s");
    assert_eq!(record["paid"], false);
    assert!(record.get("tips").is_none());
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn get_single_record() {
    let app = records_app();
    let record_id = create_record(&app, "V9", "B").await;

    let uri = format!("/api/records?action=get&recordId={}", record_id);
    let response = send(&app, get_request(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["record"]["visitorId"], "V9");
    assert_eq!(json["record"]["moneyType"], "enjoyment");

    let missing = send(&app, get_request("/api/records?action=get&recordId=REC404")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let no_id = send(&app, get_request("/api/records?action=get")).await;
    assert_eq!(no_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_listing_has_zero_pages() {
    let app = records_app();
    let json = body_json(send(&app, get_request("/api/records")).await).await;
    assert_eq!(json["records"], json!([]));
    assert_eq!(
        json["pagination"],
        json!({ "page": 1, "limit": 20, "total": 0, "totalPages": 0 })
    );
}

#[tokio::test]
async fn listing_pages_newest_first() {
    let app = records_app();
    let mut ids = Vec::new();
    for visitor in ["V1", "V2", "V3"] {
        ids.push(create_record(&app, visitor, "A").await);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let json = body_json(send(&app, get_request("/api/records?page=1&limit=2")).await).await;
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["totalPages"], 2);
    let listed: Vec<&str> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str()]);

    let json = body_json(send(&app, get_request("/api/records?page=2&limit=2")).await).await;
    assert_eq!(json["records"].as_array().unwrap().len(), 1);
    assert_eq!(json["records"][0]["id"], ids[0].as_str());
}

#[tokio::test]
async fn listing_clamps_out_of_range_paging() {
    let app = records_app();
    create_record(&app, "V1", "A").await;

    let json = body_json(send(&app, get_request("/api/records?page=0&limit=500")).await).await;
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 100);

    let json = body_json(send(&app, get_request("/api/records?page=abc&limit=-3")).await).await;
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 20);
}

#[tokio::test]
async fn listing_skips_deleted_records() {
    let app = records_app();
    let kept = create_record(&app, "V1", "A").await;
    let deleted = create_record(&app, "V2", "A").await;
    assert!(app.store.delete_record(&deleted).await);

    let json = body_json(send(&app, get_request("/api/records")).await).await;
    assert_eq!(json["pagination"]["total"], 2);
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], kept.as_str());
}

#[tokio::test]
async fn stats_on_empty_store() {
    let app = records_app();
    let json = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(json["totalTests"], 0);
    assert_eq!(json["paidCount"], 0);
    assert_eq!(json["paidRate"], "0");
    assert_eq!(json["todayTests"], 0);
    assert_eq!(
        json["typeDistribution"],
        json!({ "money": {}, "life": {}, "personality": {} })
    );
}

#[tokio::test]
async fn stats_count_tests_payments_and_types() {
    let app = records_app();
    let paid = create_record(&app, "V1", "A").await;
    create_record(&app, "V2", "B").await;
    let body = json!({ "recordId": paid, "paid": true, "paidAmount": 9.9 });
    send(&app, json_request("PUT", "/api/records", &body)).await;

    let json = body_json(send(&app, get_request("/api/records?action=stats")).await).await;
    assert_eq!(json["totalTests"], 2);
    assert_eq!(json["todayTests"], 2);
    assert_eq!(json["paidCount"], 1);
    assert_eq!(json["paidRate"], "50.0");
    assert_eq!(json["typeDistribution"]["money"], json!({ "growth": 1, "enjoyment": 1 }));
    assert_eq!(
        json["typeDistribution"]["personality"],
        json!({ "decisive": 1, "cautious": 1 })
    );
}

// ============================================================================
// Configuration, CORS and Health
// ============================================================================

#[tokio::test]
async fn unconfigured_store_is_500() {
    let app = build_app(test_config(), false, None);
    let body = json!({ "visitorId": "V1", "answers": uniform_answers("A") });

    let response = send(&app, json_request("POST", "/api/records", &body)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Service is not configured");

    let response = send(&app, get_request("/api/records?action=stats")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn preflight_is_answered_permissively() {
    let app = records_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/records")
        .header(header::ORIGIN, "https://quiz.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn health_reports_store_state() {
    let app = records_app();
    let response = send(&app, get_request("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok", "store": "up" }));

    let app = build_app(test_config(), false, None);
    let response = send(&app, get_request("/api/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["store"], "unconfigured");
}
