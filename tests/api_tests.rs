use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use bookrec_api::api::{create_router, AppContext};
use bookrec_api::error::AppResult;
use bookrec_api::models::CatalogRow;
use bookrec_api::services::{Cover, CoverSource, RankedCandidates, RetrievalModel};
use bookrec_api::store::{Catalog, IdentityIndex};

/// Ranks the same three titles for every user
struct StubModel;

impl RetrievalModel for StubModel {
    fn query(&self, _user_id: &str) -> AppResult<RankedCandidates> {
        Ok(RankedCandidates {
            scores: vec![0.91, 0.77, 0.65],
            titles: vec![b"Dune".to_vec(), b"Foundation".to_vec(), b"Emma".to_vec()],
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Only "Foundation" has a reachable cover
struct StubCovers;

#[async_trait::async_trait]
impl CoverSource for StubCovers {
    async fn resolve(&self, title: &str) -> Cover {
        if title == "Foundation" {
            Cover::Image {
                bytes: Bytes::from_static(b"JPEG"),
                content_type: Some("image/jpeg".to_string()),
            }
        } else {
            Cover::Missing
        }
    }
}

fn row(title: &str, author: &str, user_id: i64, rating: i32) -> CatalogRow {
    CatalogRow {
        book_title: title.to_string(),
        book_author: author.to_string(),
        img_l: format!("http://covers.local/{}.jpg", title),
        user_id,
        rating,
    }
}

fn create_test_server() -> TestServer {
    let mut rows = vec![
        row("Dune", "Frank Herbert", 1, 5),
        row("Emma", "Jane Austen", 1, 4),
        row("Foundation", "Isaac Asimov", 2, 3),
    ];
    for i in 0..20 {
        rows.push(row(&format!("Book number {}", i), "Prolific Author", 3, 7));
    }

    let identity = IdentityIndex::new(
        vec!["1".to_string(), "2".to_string(), "3".to_string(), "4".to_string()],
        vec!["Dune".to_string(), "Emma".to_string(), "Foundation".to_string()],
    );
    let ctx = AppContext::new(
        Arc::new(Catalog::new(rows)),
        identity,
        Arc::new(StubModel),
        Arc::new(StubCovers),
    );

    TestServer::new(create_router(Arc::new(ctx))).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 4);
    assert_eq!(body["model"], "stub");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "6f1c2a9e-6a5b-4c1e-9d7f-2b3a4c5d6e7f";
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_controls() {
    let server = create_test_server();
    let body: Value = server.get("/api/v1/controls").await.json();
    assert_eq!(body["recommendations"], json!({"min": 1, "max": 10, "default": 3}));
    assert_eq!(body["columns"], json!({"min": 1, "max": 8, "default": 5}));
}

#[tokio::test]
async fn test_list_users_and_titles() {
    let server = create_test_server();

    let users: Vec<String> = server.get("/api/v1/users").await.json();
    assert_eq!(users, vec!["1", "2", "3", "4"]);

    let titles: Vec<String> = server.get("/api/v1/titles").await.json();
    assert_eq!(titles, vec!["Dune", "Emma", "Foundation"]);
}

#[tokio::test]
async fn test_recommend_filters_read_titles_without_backfill() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "1", "count": 3, "columns": 5 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["requested"], 3);

    let rows = body["recommendations"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let cards = rows[0].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["title"], "Foundation");
    assert_eq!(cards[0]["score"], "0.77");
    assert_eq!(cards[0]["caption"], "Foundation...");
    assert_eq!(cards[0]["cover"]["kind"], "image");
    assert_eq!(cards[0]["cover"]["data"], "SlBFRw==");

    let history = body["history"]["rows"][0].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["title"], "Dune");
    assert_eq!(history[0]["rating"], 5);
    assert_eq!(history[0]["author"], "Frank Herbert");
    assert_eq!(history[0]["cover"], json!({"kind": "missing", "marker": "No Image Cover"}));
}

#[tokio::test]
async fn test_recommend_uses_default_count() {
    let server = create_test_server();
    let body: Value = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "2", "columns": 2 }))
        .await
        .json();

    assert_eq!(body["requested"], 3);
    // User 2 has read Foundation
    let rows = body["recommendations"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0]["title"], "Dune");
    assert_eq!(rows[0][1]["title"], "Emma");
}

#[tokio::test]
async fn test_recommend_rejects_out_of_range_count() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "1", "count": 11 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_rejects_negative_count_as_json_error() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "1", "count": -1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("count"));
}

#[tokio::test]
async fn test_recommend_rejects_non_numeric_columns() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "1", "columns": "wide" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommend_rejects_unknown_user() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": "999" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_capped_at_three_rows() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/users/3/history")
        .add_query_param("columns", 4)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["books"], 20);
    assert_eq!(body["gallery"]["columns"], 4);
    let rows = body["gallery"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.as_array().unwrap().len() == 4));
    assert_eq!(rows[0][0]["caption"], "Book number 0...");
}

#[tokio::test]
async fn test_history_rejects_unknown_user() {
    let server = create_test_server();
    let response = server.get("/api/v1/users/999/history").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "Unknown user id: 999");
}

#[tokio::test]
async fn test_history_rejects_out_of_range_columns() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/users/1/history")
        .add_query_param("columns", 9)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "columns must be between 1 and 8, got 9");
}

#[tokio::test]
async fn test_history_rejects_negative_columns_as_json_error() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/users/1/history")
        .add_query_param("columns", -2)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn test_history_for_user_without_rows_is_empty() {
    let server = create_test_server();
    let body: Value = server.get("/api/v1/users/4/history").await.json();
    assert_eq!(body["books"], 0);
    assert_eq!(body["gallery"]["rows"], json!([]));
}

#[tokio::test]
async fn test_cover_endpoint_returns_image_bytes() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/covers")
        .add_query_param("title", "Foundation")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(response.as_bytes().as_ref(), b"JPEG");
}

#[tokio::test]
async fn test_cover_endpoint_missing_cover() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/covers")
        .add_query_param("title", "Dune")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "No Image Cover");
}
