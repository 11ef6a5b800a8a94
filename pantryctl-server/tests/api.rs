//! End-to-end route tests against the in-memory backend.
//!
//! These drive the real router with `tower::ServiceExt::oneshot`, so they
//! exercise extractors, validation, status mapping, and response shaping
//! without needing a database.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use pantryctl_server::http::{build_router, AppState};
use pantryctl_server::store::{MemStore, Store};

async fn app() -> axum::Router {
    let store = Arc::new(MemStore::new());
    store.migrate().await.expect("migrate failed");
    build_router(AppState { store })
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("request build failed"),
        None => builder.body(Body::empty()).expect("request build failed"),
    };
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body not JSON")
    };
    (status, value)
}

async fn create_item(app: &axum::Router, body: Value) -> Value {
    let (status, item) = send(app, Method::POST, "/api/items", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create item failed: {item}");
    item
}

fn date_offset(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_item_then_use_past_zero() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;
    assert_eq!(item["barcodes"], json!([]));
    assert_eq!(item["category_name"], "Snacks");
    assert_eq!(item["location"], "");
    let id = item["id"].as_str().expect("id missing");

    let (status, tx) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": id, "type": "usage", "quantity": 10, "notes": "used all"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["type"], "usage");
    assert_eq!(tx["quantity"], 10);

    let (status, fetched) = send(&app, Method::GET, &format!("/api/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["current_stock"], 0);
}

#[tokio::test]
async fn barcode_round_trip() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Canned Tomatoes", "category": "canned-goods",
               "current_stock": 8, "min_stock": 2, "unit": "cans",
               "barcodes": ["A", "B"]}),
    )
    .await;

    let (status, found) = send(&app, Method::GET, "/api/items/barcode/B", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], item["id"]);

    let (status, body) = send(&app, Method::GET, "/api/items/barcode/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");
}

#[tokio::test]
async fn barcode_lists_normalize_to_a_set() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Paper Towels", "category": "paper-products",
               "current_stock": 12, "min_stock": 3, "unit": "rolls",
               "barcodes": ["A", "A", " A "]}),
    )
    .await;
    assert_eq!(item["barcodes"], json!(["A"]));

    // a bare string is accepted as a one-element set
    let item = create_item(
        &app,
        json!({"name": "Toilet Paper", "category": "paper-products",
               "current_stock": 24, "min_stock": 6, "unit": "rolls",
               "barcodes": "12345"}),
    )
    .await;
    assert_eq!(item["barcodes"], json!(["12345"]));

    // any other shape normalizes to empty
    let item = create_item(
        &app,
        json!({"name": "Sponges", "category": "cleaning-supplies",
               "current_stock": 4, "min_stock": 1, "unit": "packs",
               "barcodes": {"code": "X"}}),
    )
    .await;
    assert_eq!(item["barcodes"], json!([]));
}

#[tokio::test]
async fn duplicate_barcodes_conflict_naming_the_owner() {
    let app = app().await;
    let first = create_item(
        &app,
        json!({"name": "Olive Oil", "category": "other", "current_stock": 2,
               "min_stock": 1, "unit": "bottles", "barcodes": ["X"]}),
    )
    .await;
    let second = create_item(
        &app,
        json!({"name": "Vinegar", "category": "other", "current_stock": 2,
               "min_stock": 1, "unit": "bottles"}),
    )
    .await;
    let second_id = second["id"].as_str().expect("id missing");
    let first_id = first["id"].as_str().expect("id missing");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/items/{second_id}/barcodes"),
        Some(json!({"barcode": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Barcode already exists for item: Olive Oil");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/items/{first_id}/barcodes"),
        Some(json!({"barcode": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Barcode already exists for this item");

    // blank barcode payload
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/items/{second_id}/barcodes"),
        Some(json!({"barcode": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Barcode is required");

    // unknown item wins over barcode validation
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/items/missing/barcodes",
        Some(json!({"barcode": "Y"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");
}

#[tokio::test]
async fn barcode_removal() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Beans", "category": "canned-goods", "current_stock": 6,
               "min_stock": 2, "unit": "cans", "barcodes": ["B1"]}),
    )
    .await;
    let id = item["id"].as_str().expect("id missing");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/items/{id}/barcodes/B1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Barcode removed successfully");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/items/{id}/barcodes/B1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Barcode not found for this item");
}

#[tokio::test]
async fn item_validation_failures() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/items", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/items",
        Some(json!({"name": "Widget", "category": "electronics",
                    "current_stock": 1, "min_stock": 1, "unit": "pcs"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid category");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/items",
        Some(json!({"name": "Rice", "category": "snacks",
                    "current_stock": "five", "min_stock": 1, "unit": "bags"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "current_stock must be an integer");

    // numeric strings coerce
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": "5",
               "min_stock": "2", "unit": "bags"}),
    )
    .await;
    assert_eq!(item["current_stock"], 5);
    assert_eq!(item["min_stock"], 2);
}

#[tokio::test]
async fn malformed_body_keeps_error_shape() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request build failed");
    let response = app.clone().oneshot(request).await.expect("request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let body: Value = serde_json::from_slice(&bytes).expect("body not JSON");
    assert!(body["error"].as_str().expect("error missing").len() > 0);
}

#[tokio::test]
async fn update_merges_partial_fields() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags", "location": "Shelf A"}),
    )
    .await;
    let id = item["id"].as_str().expect("id missing");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/items/{id}"),
        Some(json!({"name": "Brown Rice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Brown Rice");
    assert_eq!(updated["current_stock"], 5);
    assert_eq!(updated["location"], "Shelf A");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/items/{id}"),
        Some(json!({"category": "nonsense"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid category");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/items/missing",
        Some(json!({"name": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");
}

#[tokio::test]
async fn delete_item_cascades_to_transactions() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;
    let id = item["id"].as_str().expect("id missing");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": id, "type": "restock", "quantity": 3, "notes": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item deleted successfully");

    let (status, listed) = send(&app, Method::GET, "/api/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/items/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transaction_validation() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;
    let id = item["id"].as_str().expect("id missing");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": id, "type": "restock", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": "missing", "type": "restock", "quantity": 1, "notes": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": id, "type": "refund", "quantity": 1, "notes": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid transaction type");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({"item_id": id, "type": "usage", "quantity": 0, "notes": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity must be a positive integer");
}

#[tokio::test]
async fn transactions_list_newest_first_with_item_names() {
    let app = app().await;
    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;
    let id = item["id"].as_str().expect("id missing");

    for quantity in [1, 2, 3] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(json!({"item_id": id, "type": "restock", "quantity": quantity, "notes": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) = send(&app, Method::GET, "/api/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array expected");
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0]["quantity"], 3);
    assert_eq!(listed[2]["quantity"], 1);
    assert_eq!(listed[0]["item_name"], "Rice");
}

#[tokio::test]
async fn low_stock_boundary_is_inclusive() {
    let app = app().await;
    create_item(
        &app,
        json!({"name": "AtThreshold", "category": "snacks", "current_stock": 2,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;
    create_item(
        &app,
        json!({"name": "Above", "category": "snacks", "current_stock": 3,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;

    let (status, listed) = send(&app, Method::GET, "/api/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array expected");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "AtThreshold");
}

#[tokio::test]
async fn categories_map_carries_item_ids() {
    let app = app().await;
    let (status, map) = send(&app, Method::GET, "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let keys = map.as_object().expect("map expected");
    assert_eq!(keys.len(), 8);
    assert_eq!(map["snacks"]["name"], "Snacks");
    assert_eq!(map["snacks"]["items"], json!([]));

    let item = create_item(
        &app,
        json!({"name": "Rice", "category": "snacks", "current_stock": 5,
               "min_stock": 2, "unit": "bags"}),
    )
    .await;

    let (_, map) = send(&app, Method::GET, "/api/categories", None).await;
    assert_eq!(map["snacks"]["items"], json!([item["id"]]));
}

#[tokio::test]
async fn project_crud_round_trip() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/projects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, project) = send(
        &app,
        Method::POST,
        "/api/projects",
        Some(json!({"name": "Sauerkraut #3", "type": "ferment",
                    "start_date": date_offset(0),
                    "expiry_date": date_offset(30),
                    "location": "box 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["status"], "active");
    assert_eq!(project["type"], "ferment");
    assert_eq!(project["ready_date"], Value::Null);
    let id = project["id"].as_str().expect("id missing");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/projects/{id}"),
        Some(json!({"status": "completed", "notes": "turned out great"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["name"], "Sauerkraut #3");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/projects/{id}"),
        Some(json!({"status": "paused"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid project status");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/projects/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/api/projects/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn expiring_window_is_status_and_date_bound() {
    let app = app().await;
    let (status, soon) = send(
        &app,
        Method::POST,
        "/api/projects",
        Some(json!({"name": "soon", "type": "ferment",
                    "start_date": date_offset(-10), "expiry_date": date_offset(2)})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let soon_id = soon["id"].as_str().expect("id missing");

    send(
        &app,
        Method::POST,
        "/api/projects",
        Some(json!({"name": "later", "type": "ferment",
                    "start_date": date_offset(-10), "expiry_date": date_offset(30)})),
    )
    .await;

    let (status, listed) = send(&app, Method::GET, "/api/projects/expiring?days=3", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array expected");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "soon");

    // boundary: expiry exactly today + days is included
    let (_, listed) = send(&app, Method::GET, "/api/projects/expiring?days=2", None).await;
    assert_eq!(listed.as_array().expect("array expected").len(), 1);

    let (_, listed) = send(&app, Method::GET, "/api/projects/expiring?days=1", None).await;
    assert_eq!(listed.as_array().expect("array expected").len(), 0);

    // completing the project removes it from the view regardless of date
    send(
        &app,
        Method::PUT,
        &format!("/api/projects/{soon_id}"),
        Some(json!({"status": "completed"})),
    )
    .await;
    let (_, listed) = send(&app, Method::GET, "/api/projects/expiring?days=3", None).await;
    assert_eq!(listed.as_array().expect("array expected").len(), 0);

    // default window is 7 days
    let (status, _) = send(&app, Method::GET, "/api/projects/expiring", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/projects/expiring?days=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "days must be an integer");
}

#[tokio::test]
async fn expired_view_only_returns_active_past_expiry() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/projects",
        Some(json!({"name": "overdue", "type": "ferment",
                    "start_date": date_offset(-60), "expiry_date": date_offset(-1)})),
    )
    .await;
    let (_, tossed) = send(
        &app,
        Method::POST,
        "/api/projects",
        Some(json!({"name": "tossed", "type": "ferment",
                    "start_date": date_offset(-60), "expiry_date": date_offset(-5)})),
    )
    .await;
    let tossed_id = tossed["id"].as_str().expect("id missing");
    send(
        &app,
        Method::PUT,
        &format!("/api/projects/{tossed_id}"),
        Some(json!({"status": "discarded"})),
    )
    .await;

    let (status, listed) = send(&app, Method::GET, "/api/projects/expired", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array expected");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "overdue");
}
